use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use canvas::ImageSize;
use winit::event_loop::EventLoopProxy;

/// Decoded pixels of the sketch image, top row first.
pub struct SourceImage {
    pub path: PathBuf,
    pub size: ImageSize,
    pub rgba: image::RgbaImage,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Raw text of both shader stages.
#[derive(Debug, Clone)]
pub struct ProgramSources {
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
    pub vertex: String,
    pub fragment: String,
}

/// Results posted back to the event loop by loader threads.
#[derive(Debug)]
pub(crate) enum LoadEvent {
    Image(Result<SourceImage>),
    Program(Result<ProgramSources>),
}

pub fn load_image(path: &Path) -> Result<SourceImage> {
    let decoded = image::open(path)
        .with_context(|| format!("failed to decode image at {}", path.display()))?;
    let rgba = decoded.to_rgba8();
    let size = ImageSize::new(rgba.width(), rgba.height())
        .with_context(|| format!("image at {} is empty", path.display()))?;
    Ok(SourceImage {
        path: path.to_path_buf(),
        size,
        rgba,
    })
}

/// Reads only the header to learn the image's native size.
pub fn probe_image_size(path: &Path) -> Result<ImageSize> {
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("failed to read image header at {}", path.display()))?;
    ImageSize::new(width, height)
        .with_context(|| format!("image at {} is empty", path.display()))
}

pub fn load_program_sources(vertex: &Path, fragment: &Path) -> Result<ProgramSources> {
    let read = |path: &Path, stage: &str| {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {stage} shader at {}", path.display()))
    };
    Ok(ProgramSources {
        vertex_path: vertex.to_path_buf(),
        fragment_path: fragment.to_path_buf(),
        vertex: read(vertex, "vertex")?,
        fragment: read(fragment, "fragment")?,
    })
}

/// Decodes the image on a worker thread.
pub(crate) fn spawn_image_load(proxy: EventLoopProxy<LoadEvent>, path: PathBuf) -> Result<()> {
    spawn("reefer-image", proxy, move || LoadEvent::Image(load_image(&path)))
}

/// Reads both shader stages on a worker thread.
pub(crate) fn spawn_program_load(
    proxy: EventLoopProxy<LoadEvent>,
    vertex: PathBuf,
    fragment: PathBuf,
) -> Result<()> {
    spawn("reefer-program", proxy, move || {
        LoadEvent::Program(load_program_sources(&vertex, &fragment))
    })
}

fn spawn<F>(name: &str, proxy: EventLoopProxy<LoadEvent>, job: F) -> Result<()>
where
    F: FnOnce() -> LoadEvent + Send + 'static,
{
    let thread_name = name.to_string();
    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let event = job();
            if proxy.send_event(event).is_err() {
                tracing::debug!(thread = %thread_name, "event loop closed before load finished");
            }
        })
        .map_err(|err| anyhow!("failed to spawn {name} thread: {err}"))?;
    Ok(())
}
