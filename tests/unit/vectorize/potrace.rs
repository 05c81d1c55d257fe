use super::*;
use image::Luma;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("laserframe-potrace-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn square_bitmap() -> GrayImage {
    let mut img = GrayImage::from_pixel(32, 32, Luma([255]));
    for y in 8..24 {
        for x in 8..24 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
    img
}

#[test]
fn estimate_display() {
    assert_eq!(PointEstimate::Count(42).to_string(), "~42");
    assert_eq!(PointEstimate::Unavailable.to_string(), "---");
}

#[test]
fn tuning_is_forwarded_as_flags() {
    let tuning = VectorizerTuning {
        speckle: 4,
        opt_tolerance: 0.5,
        alpha_max: 1.25,
    };
    assert_eq!(
        tuning_args(&tuning),
        ["--turdsize", "4", "--opttolerance", "0.5", "--alphamax", "1.25"]
    );
}

#[test]
fn temp_bitmap_is_removed_on_drop() {
    let dir = scratch_dir("tmp");
    let path = {
        let tmp = TempBitmap::beside(&dir.join("00001.svg"));
        std::fs::write(tmp.path(), b"x").unwrap();
        assert!(tmp.path().starts_with(&dir));
        tmp.path().to_path_buf()
    };
    assert!(!path.exists());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_binary_is_unavailable() {
    let opts = PotraceOptions {
        binary: PathBuf::from("laserframe-no-such-potrace"),
        ..PotraceOptions::default()
    };
    let err = PotraceVectorizer::locate(opts).unwrap_err();
    assert!(matches!(err, LaserframeError::Unavailable(_)), "{err}");
}

#[cfg(unix)]
mod fake_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt as _;

    const SCRIPT: &str = r##"#!/bin/sh
if [ "$1" = "--version" ]; then echo "potrace 1.16 (fake)"; exit 0; fi
echo "$@" > "$(dirname "$0")/args.txt"
cat > /dev/null
doc='<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32"><g fill="#000000" stroke="none"><path d="M 8 8 L 24 8 L 24 24 L 8 24 Z"/></g></svg>'
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
if [ -z "$out" ] || [ "$out" = "-" ]; then printf '%s' "$doc"; else printf '%s' "$doc" > "$out"; fi
"##;

    fn install(dir: &Path) -> PotraceVectorizer {
        let bin = dir.join("potrace");
        std::fs::write(&bin, SCRIPT).unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
        PotraceVectorizer::locate(PotraceOptions {
            binary: bin,
            ..PotraceOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn locate_reads_version_line() {
        let dir = scratch_dir("version");
        let v = install(&dir);
        assert_eq!(v.version(), "potrace 1.16 (fake)");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn estimate_counts_segments_from_stdout() {
        let dir = scratch_dir("estimate");
        let v = install(&dir);
        let est = v.estimate(&square_bitmap(), &VectorizerTuning::default());
        assert_eq!(est, PointEstimate::Count(4));

        let args = std::fs::read_to_string(dir.join("args.txt")).unwrap();
        assert!(args.starts_with("- -s --turdsize 2 --opttolerance 0.2 --alphamax 1"), "{args}");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn export_writes_colored_document_and_cleans_up() {
        let dir = scratch_dir("export");
        let v = install(&dir);
        let dest = dir.join("00001.svg");
        let stats = v
            .export(
                &square_bitmap(),
                &VectorizerTuning::default(),
                StrokeColor::rgb(0x12, 0xab, 0xef),
                &dest,
            )
            .unwrap();
        assert_eq!(stats, DocumentStats { paths: 1, segments: 4 });

        let text = std::fs::read_to_string(&dest).unwrap();
        assert!(text.contains(r##"<path stroke="#12abef" fill="none" d="##), "{text}");
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "bmp"))
            .collect();
        assert!(leftovers.is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

#[test]
fn real_potrace_traces_a_square() {
    let Ok(v) = PotraceVectorizer::locate(PotraceOptions::default()) else {
        eprintln!("skipping: potrace not on PATH");
        return;
    };
    match v.estimate(&square_bitmap(), &VectorizerTuning::default()) {
        PointEstimate::Count(n) => assert!(n >= 4, "{n}"),
        PointEstimate::Unavailable => panic!("estimate unavailable with potrace installed"),
    }
}

#[test]
fn null_vectorizer_refuses_exports() {
    let img = square_bitmap();
    assert_eq!(
        NullVectorizer.estimate(&img, &VectorizerTuning::default()),
        PointEstimate::Unavailable
    );
    let err = NullVectorizer
        .export(
            &img,
            &VectorizerTuning::default(),
            StrokeColor::BLACK,
            Path::new("unused.svg"),
        )
        .unwrap_err();
    assert!(matches!(err, LaserframeError::Unavailable(_)));
}
