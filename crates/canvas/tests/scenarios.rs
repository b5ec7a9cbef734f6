use canvas::{
    classify_device, DeviceClass, FrameUniforms, ImageSize, InputPolicy, LayoutRules, Point,
    PointerEvent, Sketch, Viewport,
};

#[test]
fn desktop_image_lands_on_500_by_250() {
    let image = ImageSize::new(800, 400).unwrap();
    let mut sketch = Sketch::new(
        image,
        Viewport::new(1200.0, false),
        LayoutRules::default(),
        InputPolicy::Direct,
    );
    assert_eq!(sketch.device(), DeviceClass::Desktop);
    assert_eq!(sketch.canvas().width, 500.0);
    assert_eq!(sketch.canvas().height, 250.0);

    let _ = sketch.pointer_event(PointerEvent::CursorMoved(Point::new(250.0, 125.0)));
    let uniforms = FrameUniforms::capture(&sketch, 16.0);
    assert_eq!(uniforms.mouse, [0.0, 0.0]);
    assert_eq!(uniforms.millis, 16.0);
    assert_eq!(uniforms.resolution, [500.0, 250.0]);
    assert_eq!(uniforms.image_resolution, [800.0, 400.0]);
}

#[test]
fn resize_into_mobile_viewport_shrinks_canvas() {
    let image = ImageSize::new(1024, 768).unwrap();
    let mut sketch = Sketch::new(
        image,
        Viewport::new(1920.0, false),
        LayoutRules::default(),
        InputPolicy::Direct,
    );
    let desktop = sketch.canvas();
    assert_eq!(desktop.width, 500.0);
    assert_eq!(desktop.height, 500.0 / (1024.0 / 768.0));

    assert!(sketch.viewport_changed(Viewport::new(600.0, false)));
    let mobile = sketch.canvas();
    assert_eq!(sketch.device(), DeviceClass::Mobile);
    assert_eq!(mobile.width, 300.0);
    assert_eq!(mobile.height, 300.0 / (1024.0 / 768.0));
    assert!((mobile.width / mobile.height - image.aspect_ratio()).abs() < 1e-12);
}

#[test]
fn canvas_always_matches_image_aspect() {
    let rules = LayoutRules::default();
    for (w, h) in [(1, 1), (800, 400), (400, 800), (1920, 1080), (37, 91)] {
        let image = ImageSize::new(w, h).unwrap();
        for viewport in [
            Viewport::new(320.0, true),
            Viewport::new(768.0, false),
            Viewport::new(1280.0, false),
        ] {
            let sketch = Sketch::new(image, viewport, rules, InputPolicy::Direct);
            let canvas = sketch.canvas();
            assert_eq!(canvas.height, canvas.width / (f64::from(w) / f64::from(h)));
            assert!(canvas.width == 300.0 || canvas.width == 500.0);
        }
    }
}

#[test]
fn drag_gated_touch_walkthrough() {
    let image = ImageSize::new(600, 300).unwrap();
    let mut sketch = Sketch::new(
        image,
        Viewport::new(390.0, true),
        LayoutRules::default(),
        InputPolicy::DragGated,
    );
    assert_eq!(sketch.device(), DeviceClass::Mobile);

    let _ = sketch.pointer_event(PointerEvent::TouchStarted(Point::new(120.0, 80.0)));
    assert!(sketch.pointer().is_dragging());
    assert_eq!(sketch.pointer().sticky(), Point::new(120.0, 80.0));

    let _ = sketch.pointer_event(PointerEvent::TouchMoved(Point::new(140.0, 90.0)));
    assert_eq!(sketch.pointer().sticky(), Point::new(140.0, 90.0));

    let _ = sketch.pointer_event(PointerEvent::TouchEnded);
    assert!(!sketch.pointer().is_dragging());

    let _ = sketch.pointer_event(PointerEvent::TouchMoved(Point::new(10.0, 20.0)));
    assert_eq!(sketch.pointer().sticky(), Point::new(140.0, 90.0));

    let uniforms = FrameUniforms::capture(&sketch, 0.0);
    let expected_x = (140.0_f64 / 300.0) * 2.0 - 1.0;
    let expected_y = (90.0_f64 / 150.0) * 2.0 - 1.0;
    assert!((f64::from(uniforms.mouse[0]) - expected_x).abs() < 1e-6);
    assert!((f64::from(uniforms.mouse[1]) - expected_y).abs() < 1e-6);
}

#[test]
fn repeated_capture_is_identical() {
    let image = ImageSize::new(640, 480).unwrap();
    let mut sketch = Sketch::new(
        image,
        Viewport::new(1440.0, false),
        LayoutRules::default(),
        InputPolicy::Direct,
    );
    let _ = sketch.pointer_event(PointerEvent::CursorMoved(Point::new(33.0, 44.0)));
    let a = FrameUniforms::capture(&sketch, 987.0);
    let b = FrameUniforms::capture(&sketch, 987.0);
    assert_eq!(a, b);
}

#[test]
fn classification_table() {
    assert_eq!(classify_device(768.0, false), DeviceClass::Mobile);
    assert_eq!(classify_device(769.0, false), DeviceClass::Desktop);
    assert_eq!(classify_device(1200.0, true), DeviceClass::Mobile);
}
