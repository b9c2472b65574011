//! End-to-end replacement behaviour with scripted detection backends.
//!
//! These exercise the whole pipeline (detect, canonicalize, dedupe, select,
//! composite) and the document driver without depending on the built-in
//! finder-pattern detector.

mod common;

use common::*;
use image::imageops;
use image::{Rgb, RgbImage};
use qr_swap::pipeline::REPLACEMENT_FILTER;
use qr_swap::{
    Condition, DocumentWriter, ImageSequenceWriter, OutputSequence, PageRenderer, Placement,
    Point, ReplaceConfig, ReplaceError, Replacer,
};

fn near(a: Rgb<u8>, b: Rgb<u8>, tol: u8) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= tol)
}

#[test]
fn test_single_code_is_replaced_exactly_in_its_box() {
    let image = textured_canvas(400, 400);
    // 120x90 forces a centre crop to 90x90 before resizing.
    let replacement = patterned_replacement(120, 90);

    let locator = ScriptedLocator::regions(vec![square_region(100.0, 100.0, 300.0, 300.0)]);
    let replacer = Replacer::with_locator(locator, ReplaceConfig::default());
    let report = replacer
        .replace_with_report(&image, std::slice::from_ref(&replacement))
        .unwrap();

    assert_eq!(report.detected, 1);
    assert_eq!(report.replaced, 1);
    assert!(report.conditions.is_empty());

    let expected = imageops::resize(
        &replacement.square_cropped().to_rgb(),
        200,
        200,
        REPLACEMENT_FILTER,
    );
    for (x, y, px) in report.image.enumerate_pixels() {
        let inside = (100..300).contains(&x) && (100..300).contains(&y);
        if inside {
            assert_eq!(*px, *expected.get_pixel(x - 100, y - 100), "inside at {x},{y}");
        } else {
            assert_eq!(*px, *image.get_pixel(x, y), "outside at {x},{y}");
        }
    }
}

#[test]
fn test_only_largest_code_replaced_by_default() {
    let image = textured_canvas(320, 320);
    let red = solid_replacement(20, 20, [255, 0, 0]);
    // Smaller region reported first; area ranking must still pick the 100x100 one.
    let locator = ScriptedLocator::regions(vec![
        square_region(200.0, 200.0, 280.0, 250.0),
        square_region(20.0, 20.0, 120.0, 120.0),
    ]);
    let replacer = Replacer::with_locator(locator, ReplaceConfig::default());
    let report = replacer.replace_with_report(&image, &[red]).unwrap();

    assert_eq!(report.detected, 2);
    assert_eq!(report.replaced, 1);
    assert!(report.conditions.is_empty());
    assert_eq!(*report.image.get_pixel(70, 70), Rgb([255, 0, 0]));
    for y in 200..250 {
        for x in 200..280 {
            assert_eq!(report.image.get_pixel(x, y), image.get_pixel(x, y));
        }
    }
}

#[test]
fn test_replace_all_pairs_replacements_by_area() {
    let image = textured_canvas(320, 320);
    let red = solid_replacement(8, 8, [255, 0, 0]);
    let blue = solid_replacement(8, 8, [0, 0, 255]);
    let locator = ScriptedLocator::regions(vec![
        square_region(200.0, 200.0, 280.0, 250.0),
        square_region(20.0, 20.0, 120.0, 120.0),
    ]);
    let config = ReplaceConfig::default().with_replace_all(true);
    let report = Replacer::with_locator(locator, config)
        .replace_with_report(&image, &[red, blue])
        .unwrap();

    assert_eq!(report.replaced, 2);
    assert_eq!(*report.image.get_pixel(70, 70), Rgb([255, 0, 0]));
    assert_eq!(*report.image.get_pixel(240, 225), Rgb([0, 0, 255]));
}

#[test]
fn test_surplus_codes_are_reported_not_failed() {
    let image = textured_canvas(320, 320);
    let red = solid_replacement(8, 8, [255, 0, 0]);
    let locator = ScriptedLocator::regions(vec![
        square_region(200.0, 200.0, 280.0, 250.0),
        square_region(20.0, 20.0, 120.0, 120.0),
    ]);
    let config = ReplaceConfig::default().with_replace_all(true);
    let report = Replacer::with_locator(locator, config)
        .replace_with_report(&image, &[red])
        .unwrap();

    assert_eq!(report.replaced, 1);
    assert_eq!(
        report.conditions,
        vec![Condition::InsufficientReplacements {
            retained: 2,
            available: 1
        }]
    );
    assert_eq!(report.image.get_pixel(240, 225), image.get_pixel(240, 225));
}

#[test]
fn test_code_free_image_fails_with_no_code() {
    let blank = RgbImage::from_pixel(300, 300, WHITE);
    let red = solid_replacement(8, 8, [255, 0, 0]);

    let err = Replacer::default()
        .replace(&blank, std::slice::from_ref(&red))
        .unwrap_err();
    assert!(matches!(err, ReplaceError::NoCodeDetected), "got {err:?}");

    let err = Replacer::with_locator(ScriptedLocator::default(), ReplaceConfig::default())
        .replace(&blank, &[red])
        .unwrap_err();
    assert!(matches!(err, ReplaceError::NoCodeDetected));
}

#[test]
fn test_near_duplicate_detections_collapse() {
    let image = textured_canvas(200, 200);
    let red = solid_replacement(8, 8, [255, 0, 0]);
    let locator = ScriptedLocator::regions(vec![
        square_region(50.0, 50.0, 150.0, 150.0),
        square_region(52.0, 51.0, 152.0, 151.0),
    ]);
    let config = ReplaceConfig::default()
        .with_tolerance(3.0)
        .with_replace_all(true);
    let report = Replacer::with_locator(locator, config)
        .replace_with_report(&image, &[red.clone(), red])
        .unwrap();

    assert_eq!(report.detected, 1);
    assert_eq!(report.replaced, 1);
}

#[test]
fn test_distinct_detections_survive_dedup() {
    let image = textured_canvas(200, 200);
    let red = solid_replacement(8, 8, [255, 0, 0]);
    let locator = ScriptedLocator::regions(vec![
        square_region(50.0, 50.0, 150.0, 150.0),
        square_region(55.0, 50.0, 155.0, 150.0),
    ]);
    let config = ReplaceConfig::default().with_tolerance(3.0);
    let report = Replacer::with_locator(locator, config)
        .replace_with_report(&image, &[red])
        .unwrap();
    assert_eq!(report.detected, 2);
}

#[test]
fn test_single_region_fallback_is_used() {
    let image = textured_canvas(200, 200);
    let red = solid_replacement(8, 8, [255, 0, 0]);
    let locator = ScriptedLocator {
        all: Vec::new(),
        one: Some([
            Point::new(40.0, 40.0),
            Point::new(90.0, 40.0),
            Point::new(90.0, 90.0),
            Point::new(40.0, 90.0),
        ]),
    };
    let report = Replacer::with_locator(locator, ReplaceConfig::default())
        .replace_with_report(&image, &[red])
        .unwrap();
    assert_eq!(report.replaced, 1);
    assert_eq!(*report.image.get_pixel(60, 60), Rgb([255, 0, 0]));
}

#[test]
fn test_region_with_wrong_corner_count_is_rejected() {
    let image = textured_canvas(100, 100);
    let red = solid_replacement(8, 8, [255, 0, 0]);
    let locator = ScriptedLocator::regions(vec![vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
    ]]);
    let err = Replacer::with_locator(locator, ReplaceConfig::default())
        .replace(&image, &[red])
        .unwrap_err();
    assert!(matches!(err, ReplaceError::InvalidGeometry { count: 3 }));
}

#[test]
fn test_missing_replacements_are_invalid() {
    let image = textured_canvas(100, 100);
    let locator = ScriptedLocator::regions(vec![square_region(10.0, 10.0, 50.0, 50.0)]);
    let err = Replacer::with_locator(locator, ReplaceConfig::default())
        .replace(&image, &[])
        .unwrap_err();
    assert!(matches!(err, ReplaceError::ReplacementImageInvalid { .. }));
}

#[test]
fn test_perspective_placement_stays_inside_polygon() {
    let image = textured_canvas(200, 200);
    let red = solid_replacement(16, 16, [255, 0, 0]);
    let tilted = vec![
        Point::new(90.0, 30.0),
        Point::new(170.0, 90.0),
        Point::new(110.0, 170.0),
        Point::new(30.0, 110.0),
    ];
    let config = ReplaceConfig::default().with_placement(Placement::Perspective);
    let report = Replacer::with_locator(ScriptedLocator::regions(vec![tilted]), config)
        .replace_with_report(&image, &[red])
        .unwrap();

    assert_eq!(*report.image.get_pixel(100, 100), Rgb([255, 0, 0]));
    // Bounding-box corners lie outside the tilted square.
    for (x, y) in [(35, 35), (165, 35), (165, 165), (35, 165)] {
        assert_eq!(report.image.get_pixel(x, y), image.get_pixel(x, y), "at {x},{y}");
    }
}

#[test]
fn test_document_pages_replaced_in_order_at_native_size() {
    let pages = SyntheticPages::new(60, 80, vec![90, 140, 190]);
    let red = solid_replacement(10, 10, [255, 0, 0]);
    let replacer = Replacer::with_locator(DarkBlockLocator, ReplaceConfig::default());
    assert_eq!(replacer.config().zoom, 3.0);

    let bytes = replacer
        .replace_in_document(&pages, &ImageSequenceWriter, &red)
        .unwrap();
    let frames = ImageSequenceWriter::read(&bytes).unwrap();

    assert_eq!(frames.len(), 3);
    let (x0, y0, x1, y1) = pages.code_box();
    let centre = ((x0 + x1) / 2, (y0 + y1) / 2);
    for (frame, shade) in frames.iter().zip([90u8, 140, 190]) {
        assert_eq!(frame.dimensions(), (60, 80));
        assert!(near(*frame.get_pixel(2, 2), Rgb([shade, shade, shade]), 2));
        assert!(near(*frame.get_pixel(centre.0, centre.1), Rgb([255, 0, 0]), 2));
    }
}

#[test]
fn test_sequential_document_matches_parallel() {
    let pages = SyntheticPages::new(40, 40, vec![100, 150]);
    let red = solid_replacement(10, 10, [255, 0, 0]);
    let render = |zoom| {
        (0..pages.page_count())
            .map(|i| pages.render_page(i, zoom).unwrap())
            .collect::<Vec<_>>()
    };

    let parallel = Replacer::with_locator(DarkBlockLocator, ReplaceConfig::default())
        .process_document(render(3.0), &red)
        .unwrap();
    let sequential = Replacer::with_locator(
        DarkBlockLocator,
        ReplaceConfig::default().with_parallel_pages(false),
    )
    .process_document(render(3.0), &red)
    .unwrap();
    assert_eq!(parallel.frames(), sequential.frames());
}

#[test]
fn test_document_fails_when_any_page_lacks_a_code() {
    let mut pages = SyntheticPages::new(60, 80, vec![90, 140, 190]);
    pages.with_code[1] = false;
    let red = solid_replacement(10, 10, [255, 0, 0]);

    let err = Replacer::with_locator(DarkBlockLocator, ReplaceConfig::default())
        .replace_in_document(&pages, &ImageSequenceWriter, &red)
        .unwrap_err();
    assert!(matches!(err, ReplaceError::NoCodeDetected), "got {err:?}");
}

#[test]
fn test_document_render_failure_is_reported() {
    let mut pages = SyntheticPages::new(60, 80, vec![90, 140, 190]);
    pages.fail_on = Some(2);
    let red = solid_replacement(10, 10, [255, 0, 0]);

    let err = Replacer::with_locator(DarkBlockLocator, ReplaceConfig::default())
        .replace_in_document(&pages, &ImageSequenceWriter, &red)
        .unwrap_err();
    assert!(matches!(err, ReplaceError::PageRenderFailure { page: 2, .. }));
}

#[test]
fn test_empty_document_is_a_render_failure() {
    let pages = SyntheticPages::new(60, 80, Vec::new());
    let red = solid_replacement(10, 10, [255, 0, 0]);
    let err = Replacer::with_locator(DarkBlockLocator, ReplaceConfig::default())
        .replace_in_document(&pages, &ImageSequenceWriter, &red)
        .unwrap_err();
    assert!(matches!(err, ReplaceError::PageRenderFailure { page: 0, .. }));
}

struct FailingWriter;

impl DocumentWriter for FailingWriter {
    fn assemble(&self, _pages: &OutputSequence) -> qr_swap::Result<Vec<u8>> {
        Err(ReplaceError::DocumentWriteFailure {
            reason: "disk full".into(),
        })
    }
}

#[test]
fn test_writer_failure_propagates() {
    let pages = SyntheticPages::new(60, 80, vec![120]);
    let red = solid_replacement(10, 10, [255, 0, 0]);
    let err = Replacer::with_locator(DarkBlockLocator, ReplaceConfig::default())
        .replace_in_document(&pages, &FailingWriter, &red)
        .unwrap_err();
    assert!(matches!(err, ReplaceError::DocumentWriteFailure { .. }));
}
