//! Single-page PDF sink.
//!
//! Object layout: Catalog(1), Pages(2), Page(3), Contents(4), then one image
//! XObject (and optional soft mask) per placed image from 5 upward.

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use tracing::debug;

use super::{DocumentSink, Placement};
use crate::board::Board;
use crate::consts::POINTS_PER_INCH;
use crate::error::{Result, ScalerError};

const CATALOG_ID: i32 = 1;
const PAGES_ID: i32 = 2;
const PAGE_ID: i32 = 3;
const CONTENTS_ID: i32 = 4;
const FIRST_IMAGE_ID: i32 = 5;

/// zlib level for image streams.
const COMPRESSION_LEVEL: u8 = 6;

/// Writes placed images onto one page the size of the paper.
pub struct PdfSink {
    pdf: Pdf,
    content: Content,
    x_objects: Vec<(String, Ref)>,
    next_id: i32,
    width_pt: f32,
    height_pt: f32,
}

impl PdfSink {
    pub fn new(paper_width_in: f64, paper_height_in: f64) -> Self {
        Self {
            pdf: Pdf::new(),
            content: Content::new(),
            x_objects: Vec::new(),
            next_id: FIRST_IMAGE_ID,
            width_pt: (paper_width_in * POINTS_PER_INCH) as f32,
            height_pt: (paper_height_in * POINTS_PER_INCH) as f32,
        }
    }

    /// A sink sized to the board's paper and orientation.
    pub fn for_board(board: &Board) -> Self {
        let (w, h) = board.paper_inches();
        Self::new(w, h)
    }

    pub fn image_count(&self) -> usize {
        self.x_objects.len()
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Write the page tree and return the finished document bytes.
    pub fn finish(self) -> Vec<u8> {
        let Self {
            mut pdf,
            content,
            x_objects,
            width_pt,
            height_pt,
            ..
        } = self;

        let pages_id = Ref::new(PAGES_ID);
        let page_id = Ref::new(PAGE_ID);
        let contents_id = Ref::new(CONTENTS_ID);

        pdf.catalog(Ref::new(CATALOG_ID)).pages(pages_id);
        pdf.pages(pages_id).kids([page_id]).count(1);

        let content_data = content.finish();
        pdf.stream(contents_id, &content_data);

        let mut page = pdf.page(page_id);
        page.parent(pages_id);
        page.media_box(Rect::new(0.0, 0.0, width_pt, height_pt));
        page.contents(contents_id);
        {
            let mut resources = page.resources();
            let mut dict = resources.x_objects();
            for (name, id) in &x_objects {
                dict.pair(Name(name.as_bytes()), *id);
            }
        }
        page.finish();

        pdf.finish()
    }
}

impl DocumentSink for PdfSink {
    fn add_image(&mut self, placement: &Placement<'_>) -> Result<()> {
        let raster = placement.raster;
        let (w, h) = raster.dimensions();
        let (width, height) = match (i32::try_from(w), i32::try_from(h)) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => (width, height),
            _ => return Err(ScalerError::Export(format!("{}: raster is {w}x{h}", placement.id))),
        };

        // PDF images carry no alpha; split it into a soft mask.
        let mut rgb = Vec::with_capacity(w as usize * h as usize * 3);
        let mut alpha = Vec::with_capacity(w as usize * h as usize);
        for px in raster.pixels() {
            rgb.extend_from_slice(&px.0[..3]);
            alpha.push(px.0[3]);
        }

        let mask_id = if alpha.iter().any(|&a| a < u8::MAX) {
            let id = self.alloc();
            let data = compress_to_vec_zlib(&alpha, COMPRESSION_LEVEL);
            let mut mask = self.pdf.image_xobject(id, &data);
            mask.filter(Filter::FlateDecode);
            mask.width(width);
            mask.height(height);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask.finish();
            Some(id)
        } else {
            None
        };

        let image_id = self.alloc();
        let data = compress_to_vec_zlib(&rgb, COMPRESSION_LEVEL);
        let mut image = self.pdf.image_xobject(image_id, &data);
        image.filter(Filter::FlateDecode);
        image.width(width);
        image.height(height);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        // PDF space has its origin bottom-left with y up.
        let x_pt = (placement.x_in * POINTS_PER_INCH) as f32;
        let w_pt = (placement.w_in * POINTS_PER_INCH) as f32;
        let h_pt = (placement.h_in * POINTS_PER_INCH) as f32;
        let y_pt = self.height_pt - ((placement.y_in + placement.h_in) * POINTS_PER_INCH) as f32;

        let name = format!("Im{}", self.x_objects.len());
        self.content.save_state();
        self.content.transform([w_pt, 0.0, 0.0, h_pt, x_pt, y_pt]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
        self.x_objects.push((name, image_id));

        debug!(image = %placement.id, x_pt, y_pt, w_pt, h_pt, "Image placed on page");
        Ok(())
    }
}
