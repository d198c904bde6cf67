//! End-to-end scenarios: form input through to certificate bytes.

mod common;

use common::*;
use presstest_core::render::{
    photo_caption, registration_rows, render_report, RenderError, RenderOptions,
};
use presstest_core::{
    PipelineError, Photo, PhotoLayout, Pressure, ReportPipeline, ReportProfile, Slot, Strings,
    TimestampSource, TimingMode,
};

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
}

fn render_standard(builder: &presstest_core::ReportBuilder) -> Vec<u8> {
    let record = builder.assemble(&ReportProfile::standard()).unwrap();
    render_report(&record, &RenderOptions::default()).unwrap().bytes
}

fn row<'a>(rows: &'a [Vec<String>], label: &str) -> &'a [String] {
    rows.iter()
        .find(|r| r[0] == label)
        .map(|r| &r[1..])
        .unwrap_or_else(|| panic!("no row {label}"))
}

#[test]
fn one_hour_hold_with_decay_rate() {
    let mut profile = ReportProfile::standard();
    profile.show_decay_rate = true;
    let record = complete_builder().assemble(&profile).unwrap();
    let strings = Strings::document();

    let rows = registration_rows(&record, &profile, strings);
    assert_eq!(row(&rows, strings.start_pressure), ["10.00/145.04"]);
    assert_eq!(row(&rows, strings.end_pressure), ["9.50/137.79"]);
    assert_eq!(row(&rows, strings.decay_rate), ["0.50/7.25"]);
    assert_eq!(row(&rows, strings.result), [strings.pass]);
    assert_eq!(row(&rows, strings.start_time), ["09:00"]);
    assert_eq!(row(&rows, strings.end_time), ["10:00"]);
}

#[test]
fn decay_rate_row_hidden_by_default() {
    let profile = ReportProfile::standard();
    let record = complete_builder().assemble(&profile).unwrap();
    let strings = Strings::document();

    let rows = registration_rows(&record, &profile, strings);
    assert!(rows.iter().all(|r| r[0] != strings.decay_rate));
}

#[test]
fn midnight_hold_rolls_over() {
    let mut profile = ReportProfile::standard();
    profile.show_decay_rate = true;
    let mut builder = complete_builder();
    builder
        .set_start_time(0, time(23, 30))
        .unwrap()
        .set_end_time(0, time(0, 30))
        .unwrap();
    let record = builder.assemble(&profile).unwrap();

    let rows = registration_rows(&record, &profile, Strings::document());
    assert_eq!(row(&rows, Strings::document().decay_rate), ["0.50/7.25"]);
}

#[test]
fn global_window_drives_every_compartment() {
    let profile = ReportProfile::instrumented();
    assert_eq!(profile.timing, TimingMode::Global);

    let mut builder = complete_builder();
    builder
        .set_global_end(Some(at(11, 0)))
        .set_compartment_count(2)
        .unwrap();
    for i in 0..2 {
        builder
            .set_start_pressure(i, Some(Pressure::bar(10.0)))
            .unwrap()
            .set_end_pressure(i, Some(Pressure::bar(9.0)))
            .unwrap()
            .set_result(i, presstest_core::TestResult::Pass)
            .unwrap();
    }
    let record = builder.assemble(&profile).unwrap();

    let rows = registration_rows(&record, &profile, Strings::document());
    assert_eq!(row(&rows, Strings::document().decay_rate), ["0.50/7.25", "0.50/7.25"]);
}

#[test]
fn exif_photo_caption_has_no_disclosure() {
    let bytes = jpeg_with_exif(64, 48, "2024:05:01 09:02:11");
    let photo = Photo::ingest_upload(&bytes, &clock(15, 45)).unwrap();

    assert_eq!(photo.source, TimestampSource::Exif);
    assert_eq!(photo.timestamp, day().and_hms_opt(9, 2, 11).unwrap());
    assert_eq!(
        photo_caption(Slot::Start, &photo, Strings::document()),
        "Start time: 2024-05-01 09:02"
    );
}

#[test]
fn upload_without_exif_is_disclosed() {
    let photo = Photo::ingest_upload(&png_bytes(64, 48), &clock(15, 45)).unwrap();
    let strings = Strings::document();

    let caption = photo_caption(Slot::End, &photo, strings);
    assert!(caption.starts_with("End time: 2024-05-01 15:45"));
    assert!(caption.ends_with(strings.exif_missing));
}

#[test]
fn camera_photo_caption_has_no_disclosure() {
    let photo = Photo::ingest_camera(&png_bytes(64, 48), &clock(15, 45)).unwrap();
    let caption = photo_caption(Slot::End, &photo, Strings::document());
    assert!(!caption.contains(Strings::document().exif_missing));
}

#[test]
fn uniform_photo_profile_renders() {
    let pipeline = ReportPipeline::new(ReportProfile::uniform_photos());
    let report = pipeline.generate(&complete_builder(), day()).unwrap();
    assert!(report.pdf.starts_with(b"%PDF-"));
    assert!(matches!(
        pipeline.profile().photo_layout,
        PhotoLayout::FixedAspect { width: 420, aspect: [16, 9] }
    ));
}

#[test]
fn four_compartments_span_pages() {
    let mut builder = complete_builder();
    builder.set_compartment_count(4).unwrap();
    for i in 0..4 {
        let start = Photo::ingest_camera(&png_bytes(640, 480), &clock(9, 0)).unwrap();
        let end = Photo::ingest_camera(&png_bytes(640, 480), &clock(10, 0)).unwrap();
        builder
            .set_start_pressure(i, Some(Pressure::psi(145.0)))
            .unwrap()
            .set_end_pressure(i, Some(Pressure::psi(140.0)))
            .unwrap()
            .set_result(i, presstest_core::TestResult::Fail)
            .unwrap()
            .set_photo(i, Slot::Start, start)
            .unwrap()
            .set_photo(i, Slot::End, end)
            .unwrap();
    }

    let report = ReportPipeline::default().generate(&builder, day()).unwrap();
    assert_eq!(report.compartments, 4);
    assert!(report.page_count > 1);
}

#[test]
fn logo_and_record_hash_shape_document() {
    let record = complete_builder().assemble(&ReportProfile::standard()).unwrap();
    let plain = render_report(&record, &RenderOptions::default()).unwrap();
    let with_logo = render_report(
        &record,
        &RenderOptions {
            logo: Some(signature_image()),
            record_hash: Some("f00d".to_string()),
            ..RenderOptions::default()
        },
    )
    .unwrap();

    assert_ne!(plain.bytes, with_logo.bytes);
    assert!(with_logo.bytes.len() > plain.bytes.len());
}

#[test]
fn draft_file_round_trip_to_pdf() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("start.png"), png_bytes(320, 240)).unwrap();
    std::fs::write(dir.path().join("end.jpg"), jpeg_with_exif(320, 240, "2024:05:01 10:00:00")).unwrap();
    std::fs::write(dir.path().join("sig.png"), png_bytes(300, 90)).unwrap();
    std::fs::write(
        dir.path().join("draft.json"),
        r#"{
            "project": {
                "project_name": "Harbour line 3", "manufacturer": "Acme Tanks",
                "work_order": "WO-1182", "drawing": "DRW-220",
                "revision": "B", "part_line": "Line 3 / Tank 2"
            },
            "requirements": {"test_pressure": {"value": 10.0}},
            "compartments": [{
                "date": "2024-05-01", "start_time": "09:00", "end_time": "10:00",
                "start_pressure": {"value": 10.0}, "end_pressure": {"value": 9.5},
                "result": "pass",
                "start_photo": {"path": "start.png", "source": "camera"},
                "end_photo": {"path": "end.jpg"}
            }],
            "signature": {
                "name": "J. de Vries", "company": "Acme Tanks",
                "date": "2024-05-01", "image": {"path": "sig.png"}
            }
        }"#,
    )
    .unwrap();

    let draft = presstest_core::ReportDraft::load(&dir.path().join("draft.json")).unwrap();
    let builder = draft.into_builder(dir.path(), day(), &clock(9, 0)).unwrap();
    let end = builder.compartments()[0].photos.get(Slot::End).unwrap();
    assert_eq!(end.source, TimestampSource::Exif);

    let report = ReportPipeline::default().generate(&builder, day()).unwrap();
    assert_eq!(report.filename, "2024-05-01_Harbour_line_3_Report.pdf");
}

#[test]
fn synthetic_timestamp_disclosed_in_document() {
    let mut builder = complete_builder();
    let upload = Photo::ingest_upload(&png_bytes(320, 240), &clock(9, 0)).unwrap();
    builder.set_photo(0, Slot::Start, upload).unwrap();

    let pdf = render_standard(&builder);
    assert!(contains(&pdf, "EXIF missing"));
    assert!(contains(&pdf, "Compartment test duration"));
}

#[test]
fn exif_timestamp_not_disclosed_in_document() {
    let mut builder = complete_builder();
    let start = Photo::ingest_upload(&jpeg_with_exif(320, 240, "2024:05:01 09:00:00"), &clock(15, 0)).unwrap();
    let end = Photo::ingest_upload(&jpeg_with_exif(320, 240, "2024:05:01 10:00:00"), &clock(15, 0)).unwrap();
    builder
        .set_photo(0, Slot::Start, start)
        .unwrap()
        .set_photo(0, Slot::End, end)
        .unwrap();

    let pdf = render_standard(&builder);
    assert!(!contains(&pdf, "EXIF missing"));
    assert!(contains(&pdf, "Compartment test duration"));
    assert!(contains(&pdf, "1 h 0 min"));
}

#[test]
fn duration_line_absent_without_photos() {
    let record = complete_builder().assemble(&ReportProfile::instrumented()).unwrap();
    let options = RenderOptions { profile: ReportProfile::instrumented(), ..RenderOptions::default() };
    let pdf = render_report(&record, &options).unwrap().bytes;
    assert!(!contains(&pdf, "Compartment test duration"));
}

#[test]
fn tall_portrait_photo_still_renders() {
    let mut builder = complete_builder();
    let portrait = Photo::ingest_camera(&png_bytes(1080, 2400), &clock(9, 0)).unwrap();
    builder.set_photo(0, Slot::Start, portrait).unwrap();

    let report = ReportPipeline::default().generate(&builder, day()).unwrap();
    assert!(report.pdf.starts_with(b"%PDF-"));
}

#[test]
fn photo_layout_wider_than_page_is_reported() {
    let mut profile = ReportProfile::standard();
    profile.photo_layout = PhotoLayout::ShrinkToWidth { max_width: 800 };
    let mut builder = complete_builder();
    let wide = Photo::ingest_camera(&png_bytes(1600, 900), &clock(9, 0)).unwrap();
    builder.set_photo(0, Slot::Start, wide).unwrap();

    let err = ReportPipeline::new(profile).generate(&builder, day()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Render(RenderError::PhotoLayout { width: 800, .. })
    ));
}
