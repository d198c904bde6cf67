//! PDF serialization of a finished layout.
//!
//! Object numbering and write order depend only on the layout, and no
//! creation date or random file identifier is written, so equal layouts
//! serialize to equal bytes.

use std::collections::BTreeSet;

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::print::PageSpec;
use crate::render::fonts::{encode_win_ansi, Face};
use crate::render::layout::{DrawOp, Layout};

pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
    pub producer: String,
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

fn page_content(ops: &[DrawOp]) -> Vec<u8> {
    let mut content = Content::new();
    for op in ops {
        match op {
            DrawOp::Fill { x, y, w, h, gray } => {
                content.save_state();
                content.set_fill_gray(*gray);
                content.rect(*x, *y, *w, *h);
                content.fill_nonzero();
                content.restore_state();
            }
            DrawOp::Stroke { x, y, w, h, line_width } => {
                content.set_line_width(*line_width);
                content.rect(*x, *y, *w, *h);
                content.stroke();
            }
            DrawOp::Text { x, y, face, size, text } => {
                let encoded = encode_win_ansi(text);
                content.begin_text();
                content.set_font(Name(face.resource_name()), *size);
                content.next_line(*x, *y);
                content.show(Str(&encoded));
                content.end_text();
            }
            DrawOp::Image { x, y, w, h, index } => {
                let name = image_name(*index);
                content.save_state();
                content.transform([*w, 0.0, 0.0, *h, *x, *y]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
        }
    }
    content.finish()
}

pub fn write_pdf(layout: &Layout, spec: &PageSpec, info: &DocumentInfo) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let image_ids: Vec<Ref> = layout.images.iter().map(|_| alloc.bump()).collect();
    let page_ids: Vec<(Ref, Ref)> = layout
        .pages
        .iter()
        .map(|_| (alloc.bump(), alloc.bump()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page, _)| *page))
        .count(page_ids.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr(&info.title))
        .subject(TextStr(&info.subject))
        .producer(TextStr(&info.producer));

    for (face, id) in [(Face::Regular, regular_id), (Face::Bold, bold_id)] {
        pdf.type1_font(id)
            .base_font(Name(face.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    for (image, id) in layout.images.iter().zip(&image_ids) {
        let mut xobject = pdf.image_xobject(*id, &image.jpeg);
        xobject.filter(Filter::DctDecode);
        xobject.width(image.width as i32);
        xobject.height(image.height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
    }

    for (page, (page_id, content_id)) in layout.pages.iter().zip(&page_ids) {
        let used: BTreeSet<usize> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        let names: Vec<(String, Ref)> = used
            .iter()
            .map(|index| (image_name(*index), image_ids[*index]))
            .collect();

        let mut writer = pdf.page(*page_id);
        writer.media_box(Rect::new(0.0, 0.0, spec.width_pt, spec.height_pt));
        writer.parent(tree_id);
        writer.contents(*content_id);
        let mut resources = writer.resources();
        resources
            .fonts()
            .pair(Name(Face::Regular.resource_name()), regular_id)
            .pair(Name(Face::Bold.resource_name()), bold_id);
        if !names.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, id) in &names {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
            xobjects.finish();
        }
        resources.finish();
        writer.finish();

        let content = page_content(&page.ops);
        pdf.stream(*content_id, &content);
    }

    pdf.finish()
}
