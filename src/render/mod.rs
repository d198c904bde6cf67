//! Document Renderer
//!
//! `render_report` is a pure function of the record and its options. It has
//! no validation duty: an assembled [`ReportRecord`] is complete by
//! construction. Output language is always English.

pub mod fonts;
pub mod layout;
pub mod pdf;

use thiserror::Error;

use crate::locale::Strings;
use crate::media::{self, MediaError, Photo, RasterImage};
use crate::print::PageSpec;
use crate::profile::{PhotoLayout, ReportProfile};
use crate::record::{ReportRecord, Slot};
use crate::timing::fmt_duration;
use crate::units::{fmt_pressure, fmt_pressure_pair};

use layout::{Composer, Table, BODY, BODY_BOLD, HEADING, SUBHEADING, TITLE};

const LOGO_SIZE: (f32, f32) = (120.0, 40.0);
const WHITESMOKE: f32 = 0.96;
const LIGHT_GREY: f32 = 0.83;
const KEY_VALUE_COLUMNS: [f32; 2] = [160.0, 360.0];
const REQUIREMENT_COLUMNS: [f32; 2] = [200.0, 320.0];
const REGISTRATION_LABEL: f32 = 200.0;
const REGISTRATION_VALUES: f32 = 320.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("table columns {widths:?} do not fit a {frame} pt frame")]
    DegenerateColumns { widths: Vec<f32>, frame: f32 },

    #[error("block of {height} pt does not fit a {frame} pt page frame")]
    BlockTooTall { height: f32, frame: f32 },

    #[error("block {width} pt wide does not fit a {frame} pt page frame")]
    BlockTooWide { width: f32, frame: f32 },

    #[error("photo blocks of {width}x{height} pt exceed the {frame_width}x{frame_height} pt page frame")]
    PhotoLayout {
        width: u32,
        height: u32,
        frame_width: f32,
        frame_height: f32,
    },

    #[error("image error: {0}")]
    Image(#[from] MediaError),
}

/// Everything besides the record that shapes the document.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub profile: ReportProfile,
    pub page: PageSpec,
    pub logo: Option<RasterImage>,
    /// Written into the document info as its subject.
    pub record_hash: Option<String>,
}

/// Bytes plus page count of a rendered certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Fails when the profile's photo blocks cannot fit the page frame.
pub fn check_photo_layout(layout: &PhotoLayout, page: &PageSpec) -> Result<(), RenderError> {
    let (width, height) = match *layout {
        PhotoLayout::ShrinkToWidth { max_width } => (max_width, 0),
        PhotoLayout::FixedAspect { width, aspect } => (width, media::fixed_aspect_height(width, aspect)),
    };
    if width as f32 > page.frame_width() || height as f32 > page.frame_height() {
        return Err(RenderError::PhotoLayout {
            width,
            height,
            frame_width: page.frame_width(),
            frame_height: page.frame_height(),
        });
    }
    Ok(())
}

pub fn render_report(record: &ReportRecord, options: &RenderOptions) -> Result<RenderedPdf, RenderError> {
    if options.profile.require_photos {
        check_photo_layout(&options.profile.photo_layout, &options.page)?;
    }
    let strings = Strings::document();
    let mut doc = Composer::new(options.page);

    if let Some(logo) = &options.logo {
        let index = doc.embed(logo.pixels())?;
        doc.image_block(index, LOGO_SIZE.0, LOGO_SIZE.1);
        doc.spacer(6.0);
    }
    doc.paragraph(strings.title, &TITLE);
    doc.spacer(10.0);

    project_section(&mut doc, record, strings)?;
    requirements_section(&mut doc, record, strings)?;
    registration_section(&mut doc, record, &options.profile, strings)?;
    if options.profile.require_photos {
        photo_section(&mut doc, record, &options.profile, &options.page, strings)?;
    }
    signature_section(&mut doc, record, &options.page, strings)?;

    let layout = doc.finish();
    let page_count = layout.pages.len();
    let info = pdf::DocumentInfo {
        title: format!("{} - {}", strings.title, record.meta().project_name),
        subject: options.record_hash.clone().unwrap_or_default(),
        producer: format!("presstest-core {}", crate::ENGINE_VERSION),
    };
    let bytes = pdf::write_pdf(&layout, &options.page, &info);
    tracing::debug!(pages = page_count, bytes = bytes.len(), "certificate rendered");
    Ok(RenderedPdf { bytes, page_count })
}

fn key_value_table(rows: Vec<(&str, String)>, widths: [f32; 2], header_fill: Option<f32>) -> Table {
    Table {
        col_widths: widths.to_vec(),
        rows: rows.into_iter().map(|(k, v)| vec![k.to_string(), v]).collect(),
        header_rows: 0,
        header_fill,
        repeat_header: false,
    }
}

fn project_section(doc: &mut Composer, record: &ReportRecord, strings: &'static Strings) -> Result<(), RenderError> {
    let rows = record
        .meta()
        .fields(strings)
        .into_iter()
        .map(|(label, value)| (label, value.to_string()))
        .collect();
    let mut table = key_value_table(rows, KEY_VALUE_COLUMNS, Some(WHITESMOKE));
    table.header_rows = 1;
    doc.table(&table)?;
    doc.spacer(10.0);
    Ok(())
}

fn requirements_section(doc: &mut Composer, record: &ReportRecord, strings: &Strings) -> Result<(), RenderError> {
    let req = record.requirements();
    let (bar, psi) = record.test_pressure_pair();
    let mut rows = vec![
        (
            strings.test_pressure,
            format!(
                "{} {} / {} {}",
                fmt_pressure(Some(bar)),
                crate::units::PressureUnit::Bar.label(),
                fmt_pressure(Some(psi)),
                crate::units::PressureUnit::Psi.label()
            ),
        ),
        (strings.notes, req.notes.clone()),
    ];
    if let Some(instrument) = &req.instrument {
        rows.push((strings.instrument_id, instrument.id.clone()));
        rows.push((strings.calibration_date, instrument.calibration_date.format("%Y-%m-%d").to_string()));
    }
    if let Some(window) = record.timing() {
        rows.push((strings.test_start, window.start.format("%Y-%m-%d %H:%M").to_string()));
        rows.push((strings.test_end, window.end.format("%Y-%m-%d %H:%M").to_string()));
        rows.push((strings.test_duration, fmt_duration(window.elapsed(), strings)));
    }

    doc.paragraph(strings.requirements, &HEADING);
    let mut table = key_value_table(rows, REQUIREMENT_COLUMNS, Some(WHITESMOKE));
    table.header_rows = 1;
    doc.table(&table)?;
    doc.spacer(10.0);
    Ok(())
}

fn row(label: &str, count: usize, cell: impl Fn(usize) -> String) -> Vec<String> {
    std::iter::once(label.to_string())
        .chain((0..count).map(cell))
        .collect()
}

/// Label cell followed by one cell per compartment.
pub fn registration_rows(record: &ReportRecord, profile: &ReportProfile, strings: &Strings) -> Vec<Vec<String>> {
    let comps = record.compartments();
    let n = comps.len();
    let rates = record.decay_rates();

    let mut rows = vec![
        row("", n, |i| (i + 1).to_string()),
        row(strings.date, n, |i| comps[i].date.format("%Y-%m-%d").to_string()),
        row(strings.start_time, n, |i| comps[i].start_time.format("%H:%M").to_string()),
        row(strings.start_pressure, n, |i| {
            fmt_pressure_pair(Some(comps[i].start_bar), Some(comps[i].start_psi()))
        }),
        row(strings.end_time, n, |i| comps[i].end_time.format("%H:%M").to_string()),
        row(strings.end_pressure, n, |i| {
            fmt_pressure_pair(Some(comps[i].end_bar), Some(comps[i].end_psi()))
        }),
        row(strings.result, n, |i| comps[i].result.label(strings).to_string()),
    ];
    if profile.show_decay_rate {
        rows.push(row(strings.decay_rate, n, |i| match rates[i] {
            Some(rate) => fmt_pressure_pair(Some(rate.bar_per_hour), Some(rate.psi_per_hour)),
            None => String::new(),
        }));
    }
    rows.push(row(strings.remarks, n, |i| comps[i].remarks.clone()));
    rows
}

fn registration_section(
    doc: &mut Composer,
    record: &ReportRecord,
    profile: &ReportProfile,
    strings: &Strings,
) -> Result<(), RenderError> {
    let n = record.compartments().len().max(1);
    let mut col_widths = vec![REGISTRATION_LABEL];
    col_widths.extend(std::iter::repeat(REGISTRATION_VALUES / n as f32).take(n));

    doc.paragraph(strings.equipment, &HEADING);
    doc.table(&Table {
        col_widths,
        rows: registration_rows(record, profile, strings),
        header_rows: 1,
        header_fill: Some(LIGHT_GREY),
        repeat_header: true,
    })?;
    doc.spacer(10.0);
    Ok(())
}

/// Caption under a gallery photo, with the disclosure when its time is synthetic.
pub fn photo_caption(slot: Slot, photo: &Photo, strings: &Strings) -> String {
    let label = match slot {
        Slot::Start => strings.start_caption,
        Slot::End => strings.end_caption,
    };
    let mut caption = format!("{}: {}", label, photo.timestamp.format("%Y-%m-%d %H:%M"));
    if photo.is_synthetic() {
        caption.push_str(" \u{2013} ");
        caption.push_str(strings.exif_missing);
    }
    caption
}

fn photo_section(
    doc: &mut Composer,
    record: &ReportRecord,
    profile: &ReportProfile,
    page: &PageSpec,
    strings: &Strings,
) -> Result<(), RenderError> {
    let max_height = page.frame_height().floor() as u32;
    doc.paragraph(strings.photos, &HEADING);
    for (i, compartment) in record.compartments().iter().enumerate() {
        doc.paragraph(&format!("{} {}", strings.compartment, i + 1), &SUBHEADING);
        for slot in [Slot::Start, Slot::End] {
            let Some(photo) = compartment.photos.get(slot) else {
                continue;
            };
            let normalized = media::normalize(photo.image.pixels(), &profile.photo_layout, max_height);
            doc.image(&normalized)?;
            doc.paragraph(&photo_caption(slot, photo, strings), &BODY);
            doc.spacer(6.0);
            if slot == Slot::End {
                if let Some(span) = compartment.photo_duration() {
                    let line = format!("{}: {}", strings.comp_duration, fmt_duration(span, strings));
                    doc.paragraph(&line, &BODY_BOLD);
                    doc.spacer(10.0);
                }
            }
        }
    }
    Ok(())
}

fn signature_section(
    doc: &mut Composer,
    record: &ReportRecord,
    page: &PageSpec,
    strings: &Strings,
) -> Result<(), RenderError> {
    let sig = record.signature();
    doc.paragraph(strings.signature, &HEADING);
    let max_width = page.frame_width().floor() as u32;
    let max_height = page.frame_height().floor() as u32;
    doc.image(&media::shrink_to_fit(sig.image.pixels(), max_width, max_height))?;
    doc.spacer(6.0);
    doc.table(&key_value_table(
        vec![
            (strings.sign_name, sig.name.clone()),
            (strings.sign_company, sig.company.clone()),
            (strings.sign_date, sig.date.format("%Y-%m-%d").to_string()),
        ],
        KEY_VALUE_COLUMNS,
        None,
    ))?;
    Ok(())
}
