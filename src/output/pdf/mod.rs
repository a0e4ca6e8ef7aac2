//! PDF rendition of the report.
//!
//! Pages are drawn with the standard Helvetica fonts and plain vector paths,
//! so the document needs no embedded fonts or images. Every page gets a
//! `Page n of N` footer once the page count is known.

mod canvas;
mod charts;
mod table;

use log::{debug, warn};
use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

use crate::error::Result;
use crate::report::ReportSection;

use canvas::{Canvas, BLACK, BOLD, GREY, REGULAR};

/// A4 portrait, in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;

/// Lowest baseline page content may use; the footer sits below it.
const BOTTOM_LIMIT: f32 = 40.0;

/// Renders `sections` as a PDF document into `output`.
///
/// A chart page that cannot be encoded is logged and left out; the rest of the
/// document is still written.
pub fn write_pdf(sections: &[ReportSection], output: &mut dyn Write) -> Result<()> {
    let mut pdf = PdfBuilder::new();

    for section in sections {
        match section {
            ReportSection::Cover {
                generated_at_display,
                window_hours,
                ..
            } => pdf.add_page(cover_page(generated_at_display, *window_hours))?,
            ReportSection::PipelineTable {
                pipeline_name,
                rows,
            } => {
                for page in table::table_pages(pipeline_name, rows) {
                    pdf.add_page(page)?;
                }
            }
            ReportSection::PipelineCharts {
                pipeline_name,
                charts,
            } => {
                let heading = format!("Pipeline: {pipeline_name}");
                let page = charts::chart_page(&heading, charts);
                pdf.add_chart_page(&heading, page);
            }
            ReportSection::AggregateCharts { charts } => {
                let heading = "Aggregate Analytics (All Pipelines)";
                pdf.add_chart_page(heading, charts::chart_page(heading, charts));
            }
            ReportSection::Summary {
                total,
                succeeded,
                failed,
            } => pdf.add_page(summary_page(*total, *succeeded, *failed))?,
        }
    }

    pdf.finish(output)
}

fn cover_page(generated_at: &str, window_hours: u32) -> Canvas {
    let center = PAGE_WIDTH / 2.0;
    let mut canvas = Canvas::new();
    canvas.text_centered(center, PAGE_HEIGHT - 283.0, 24.0, BOLD, "ADO BUILDS REPORT");
    canvas.text_centered(
        center,
        PAGE_HEIGHT - 326.0,
        18.0,
        REGULAR,
        &format!("(Last {window_hours} hours)"),
    );
    canvas.text_centered(
        center,
        PAGE_HEIGHT - 368.0,
        14.0,
        REGULAR,
        &format!("Time of report: {generated_at}"),
    );
    canvas
}

fn summary_page(total: usize, succeeded: usize, failed: usize) -> Canvas {
    let mut canvas = Canvas::new();
    canvas.text(30.0, PAGE_HEIGHT - 40.0, 18.0, BOLD, BLACK, "Summary");

    let lines = [
        ("Total builds", total),
        ("Succeeded", succeeded),
        ("Failed", failed),
    ];
    let mut y = PAGE_HEIGHT - 80.0;
    for (label, value) in lines {
        canvas.text(30.0, y, 12.0, REGULAR, BLACK, label);
        canvas.text(160.0, y, 12.0, BOLD, BLACK, &value.to_string());
        y -= 20.0;
    }
    canvas
}

struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    /// Content stream of each page body, in page order.
    bodies: Vec<ObjectId>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            bodies: Vec::new(),
        }
    }

    fn encode(&mut self, canvas: Canvas) -> Result<ObjectId> {
        let content = Content {
            operations: canvas.into_operations(),
        };
        let stream = Stream::new(dictionary! {}, content.encode()?);
        Ok(self.doc.add_object(stream))
    }

    fn add_page(&mut self, canvas: Canvas) -> Result<()> {
        let body = self.encode(canvas)?;
        self.bodies.push(body);
        Ok(())
    }

    fn add_chart_page(&mut self, heading: &str, canvas: Canvas) {
        if let Err(e) = self.add_page(canvas) {
            warn!("Skipping chart page '{heading}': {e}");
        }
    }

    fn finish(mut self, output: &mut dyn Write) -> Result<()> {
        let regular_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR => regular_id,
                BOLD => bold_id,
            },
        });

        let page_count = self.bodies.len();
        let mut kids: Vec<Object> = Vec::with_capacity(page_count);
        for (index, body) in std::mem::take(&mut self.bodies).into_iter().enumerate() {
            let mut footer = Canvas::new();
            footer.text(
                20.0,
                20.0,
                8.0,
                REGULAR,
                GREY,
                &format!("Page {} of {page_count}", index + 1),
            );
            let footer_id = self.encode(footer)?;

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => vec![Object::Reference(body), Object::Reference(footer_id)],
            });
            kids.push(Object::Reference(page_id));
        }

        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH as i64),
            Object::Integer(PAGE_HEIGHT as i64),
        ];
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal("ADO Builds Report"),
            "Producer" => Object::string_literal(concat!("ado-report ", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
        debug!("Writing PDF with {page_count} pages");

        let mut output = output;
        self.doc.save_to(&mut output)?;
        Ok(())
    }
}
