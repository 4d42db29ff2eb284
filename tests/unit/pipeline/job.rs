use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_pipeline_job").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn job(dir: &Path, input: &str, frame: &str) -> ScreenshotJob {
    ScreenshotJob {
        input: dir.join(input),
        output: dir.join("out.png"),
        frame: frame.to_string(),
    }
}

#[test]
fn run_writes_canvas_sized_png() {
    let dir = scratch_dir("canvas_sized");
    write_png(&dir.join("shot.png"), 120, 260);

    let registry = FrameRegistry::builtin();
    let rasterizer = Rasterizer::new();
    let pipeline = FramingPipeline::new(&registry, &rasterizer);

    let job = job(&dir, "shot.png", "iphone");
    let size = pipeline.run(&job).unwrap();
    assert_eq!(
        size,
        PixelSize {
            width: 750,
            height: 1576
        }
    );

    let written = image::open(&job.output).unwrap();
    assert_eq!((written.width(), written.height()), (750, 1576));
}

#[test]
fn run_twice_is_byte_identical() {
    let dir = scratch_dir("idempotent");
    write_png(&dir.join("shot.png"), 90, 60);

    let registry = FrameRegistry::builtin();
    let rasterizer = Rasterizer::new();
    let pipeline = FramingPipeline::new(&registry, &rasterizer);
    let job = job(&dir, "shot.png", "ipad");

    pipeline.run(&job).unwrap();
    let first = std::fs::read(&job.output).unwrap();
    pipeline.run(&job).unwrap();
    let second = std::fs::read(&job.output).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_frame_fails_before_reading_input() {
    let dir = scratch_dir("unknown_frame");
    let registry = FrameRegistry::builtin();
    let rasterizer = Rasterizer::new();
    let pipeline = FramingPipeline::new(&registry, &rasterizer);

    // The input does not exist; the frame lookup error must win over the IO error.
    let job = job(&dir, "missing.png", "watch");
    let err = pipeline.run(&job).unwrap_err();
    assert!(
        matches!(err.root(), FramerError::UnknownFrameType { .. }),
        "{err}"
    );
    assert!(!job.output.exists());
}

#[test]
fn corrupt_input_leaves_no_output_and_carries_input_path() {
    let dir = scratch_dir("corrupt");
    std::fs::write(dir.join("bad.png"), b"not a png at all").unwrap();

    let registry = FrameRegistry::builtin();
    let rasterizer = Rasterizer::new();
    let pipeline = FramingPipeline::new(&registry, &rasterizer);

    let job = job(&dir, "bad.png", "iphone");
    let err = pipeline.run(&job).unwrap_err();
    match &err {
        FramerError::Job { input, source } => {
            assert_eq!(input, &job.input);
            assert!(matches!(**source, FramerError::Decode(_)), "{source}");
        }
        other => panic!("expected job-wrapped error, got {other}"),
    }
    assert!(!job.output.exists());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
}

#[test]
fn write_atomic_replaces_existing_file_and_leaves_no_temp() {
    let dir = scratch_dir("atomic");
    let path = dir.join("a.png");
    std::fs::write(&path, b"old").unwrap();

    write_atomic(&path, b"new").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"new");
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
}

#[test]
fn write_atomic_into_missing_dir_fails_cleanly() {
    let dir = scratch_dir("atomic_missing");
    let path = dir.join("nope").join("a.png");
    let err = write_atomic(&path, b"x").unwrap_err();
    assert!(matches!(err, FramerError::Io { .. }), "{err}");
    assert!(!path.exists());
}
