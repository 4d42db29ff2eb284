use super::*;

#[test]
fn builtin_screens_fit_inside_canvases() {
    let registry = FrameRegistry::builtin();
    assert!(registry.iter().count() >= 2);
    for frame in registry.iter() {
        assert!(frame.screen.width <= frame.canvas.width, "{}", frame.name);
        assert!(frame.screen.height <= frame.canvas.height, "{}", frame.name);
    }
    // The builtin table must also pass the checked constructor.
    FrameRegistry::new(registry.iter().cloned().collect()).unwrap();
}

#[test]
fn lookup_returns_preset_geometry() {
    let registry = FrameRegistry::builtin();

    let iphone = registry.lookup("iphone").unwrap();
    assert_eq!((iphone.screen.width, iphone.screen.height), (710, 1536));
    assert_eq!((iphone.canvas.width, iphone.canvas.height), (750, 1576));

    let ipad = registry.lookup("ipad").unwrap();
    assert_eq!((ipad.screen.width, ipad.screen.height), (1024, 1366));
    assert_eq!((ipad.canvas.width, ipad.canvas.height), (1060, 1400));
}

#[test]
fn lookup_unknown_lists_valid_names() {
    let err = FrameRegistry::builtin().lookup("pixel").unwrap_err();
    match err {
        FramerError::UnknownFrameType { name, available } => {
            assert_eq!(name, "pixel");
            assert_eq!(available, "iphone, ipad");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn builtin_templates_match_canvas_geometry() {
    let registry = FrameRegistry::builtin();
    for frame in registry.iter() {
        let TemplateRef::Embedded { svg, .. } = &frame.template else {
            panic!("builtin template should be embedded");
        };
        assert_eq!(svg.matches("{{SCREENSHOT_DATA}}").count(), 1);

        let tree = usvg::Tree::from_str(svg, &usvg::Options::default()).unwrap();
        assert_eq!(tree.size().width() as u32, frame.canvas.width);
        assert_eq!(tree.size().height() as u32, frame.canvas.height);
    }
}

#[test]
fn new_rejects_duplicates_and_oversized_screens() {
    let iphone = FrameRegistry::builtin().lookup("iphone").unwrap().clone();

    assert!(FrameRegistry::new(vec![iphone.clone(), iphone.clone()]).is_err());

    let mut broken = iphone;
    broken.name = "broken".to_string();
    broken.screen = PixelSize {
        width: 800,
        height: 100,
    };
    assert!(FrameRegistry::new(vec![broken]).is_err());
}

#[test]
fn template_dir_overrides_every_preset() {
    let registry = FrameRegistry::builtin().with_template_dir(Path::new("custom"));
    let ipad = registry.lookup("ipad").unwrap();
    assert_eq!(
        ipad.template,
        TemplateRef::File(Path::new("custom").join("ipad.svg"))
    );
    assert_eq!(ipad.canvas.width, 1060);
    assert_eq!(ipad.template.to_string(), Path::new("custom").join("ipad.svg").display().to_string());
}
