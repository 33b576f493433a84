//! PDF output for imposed card sheets

use super::{PageRenderer, create_image_xobject};
use crate::constants::mm_to_pt;
use crate::layout::Rect;
use crate::marks::LineSegment;
use crate::preprocess::{AssetId, RenderedAsset};
use crate::types::{CardImposeError, Result, SheetSide};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Page under construction
struct OpenPage {
    side: SheetSide,
    ops: Vec<String>,
    xobjects: Dictionary,
}

/// Renders card sheets into a `lopdf` document
pub struct PdfRenderer {
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    page_width_pt: f32,
    page_height_pt: f32,
    /// Embedded images, so a shared back image is stored once
    image_cache: HashMap<AssetId, ObjectId>,
    current: Option<OpenPage>,
}

impl PdfRenderer {
    pub fn new(page_width_mm: f32, page_height_mm: f32) -> Self {
        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();

        Self {
            output,
            pages_tree_id,
            page_refs: Vec::new(),
            page_width_pt: mm_to_pt(page_width_mm),
            page_height_pt: mm_to_pt(page_height_mm),
            image_cache: HashMap::new(),
            current: None,
        }
    }

    /// Convert a sheet-space y (mm from the top) to PDF y (pt from the bottom)
    fn pdf_y(&self, y_mm: f32) -> f32 {
        self.page_height_pt - mm_to_pt(y_mm)
    }

    fn open_page(&mut self) -> Result<&mut OpenPage> {
        self.current
            .as_mut()
            .ok_or_else(|| CardImposeError::Config("draw call outside of a page".to_string()))
    }

    fn embed(&mut self, asset: &RenderedAsset) -> Result<ObjectId> {
        if let Some(&id) = self.image_cache.get(&asset.id()) {
            return Ok(id);
        }
        let id = create_image_xobject(&mut self.output, asset)?;
        self.image_cache.insert(asset.id(), id);
        Ok(id)
    }
}

impl PageRenderer for PdfRenderer {
    type Output = Document;

    fn begin_page(&mut self, side: SheetSide) -> Result<()> {
        if self.current.is_some() {
            self.end_page()?;
        }
        self.current = Some(OpenPage {
            side,
            ops: Vec::new(),
            xobjects: Dictionary::new(),
        });
        Ok(())
    }

    fn draw_image(&mut self, asset: &RenderedAsset, rect: &Rect) -> Result<()> {
        let xobject_id = self.embed(asset)?;
        let x = mm_to_pt(rect.x);
        let y = self.pdf_y(rect.bottom());
        let width = mm_to_pt(rect.width);
        let height = mm_to_pt(rect.height);

        let name = format!("Im{}", asset.id().0);
        let page = self.open_page()?;
        page.xobjects
            .set(name.as_bytes(), Object::Reference(xobject_id));
        page.ops.push(format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            width, height, x, y, name
        ));
        Ok(())
    }

    fn draw_line(&mut self, line: &LineSegment, stroke_mm: f32) -> Result<()> {
        let (x1, y1) = (mm_to_pt(line.x1), self.pdf_y(line.y1));
        let (x2, y2) = (mm_to_pt(line.x2), self.pdf_y(line.y2));
        let width = mm_to_pt(stroke_mm);

        let page = self.open_page()?;
        page.ops.push(format!(
            "q 0 0 0 RG {} w {} {} m {} {} l S Q\n",
            width, x1, y1, x2, y2
        ));
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };

        let content = page.ops.join("");
        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(page.xobjects));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_tree_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.page_width_pt),
                Object::Real(self.page_height_pt),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        let page_id = self.output.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        log::debug!("Emitted {:?} page {}", page.side, self.page_refs.len());
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.page_refs.len() + usize::from(self.current.is_some())
    }

    fn finish(mut self) -> Result<Document> {
        self.end_page()?;

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);
        self.output.compress();

        Ok(self.output)
    }
}

/// Write the finished document to `path`.
///
/// Bytes go to a temporary file next to the destination which is then
/// renamed into place, so a failed write never leaves a partial PDF.
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    tokio::task::spawn_blocking(move || {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        write_atomic(&path, &bytes)
    })
    .await?
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let output_error = |source: std::io::Error| CardImposeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(output_error)?;
    file.write_all(bytes).map_err(output_error)?;
    file.flush().map_err(output_error)?;
    file.persist(path).map_err(|e| output_error(e.error))?;
    Ok(())
}
