//! Low-level PDF output builder.
//!
//! [`OutputDocument`] accumulates pages as operation lists and assembles the
//! final document once, on [`OutputDocument::save`]. Pages are either drawn
//! from scratch or imported verbatim from a source document and stamped with
//! overlay operations.

use crate::error::{Error, Result};
use crate::render::fonts::{self, Font};
use crate::render::options::Rgb;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Page attributes that may be inherited from ancestors in a page tree.
const INHERITED_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

#[derive(Debug)]
enum PageSlot {
    /// Page drawn from scratch.
    Drawn { operations: Vec<Operation> },

    /// Page imported from a source document, plus overlay operations drawn
    /// on top of the original content.
    Imported {
        page_id: ObjectId,
        overlay: Vec<Operation>,
    },
}

/// Builder for the comparison report PDF.
#[derive(Debug)]
pub struct OutputDocument {
    doc: Document,
    pages: Vec<PageSlot>,
    page_width: f32,
    page_height: f32,
    font_ids: [(Font, ObjectId); 3],
}

impl OutputDocument {
    /// Create an empty output document with the given page size for drawn
    /// pages. Imported pages keep their source size.
    pub fn new(page_width: f32, page_height: f32) -> Self {
        let mut doc = Document::with_version("1.5");
        let font_ids = Font::ALL.map(|font| {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_name(),
                "Encoding" => "WinAnsiEncoding",
            });
            (font, id)
        });

        Self {
            doc,
            pages: Vec::new(),
            page_width,
            page_height,
            font_ids,
        }
    }

    /// Append a blank drawn page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(PageSlot::Drawn {
            operations: Vec::new(),
        });
        self.pages.len() - 1
    }

    /// Page size for drawn pages.
    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    /// Size of a specific page; imported pages report their media box.
    pub fn page_dimensions(&self, page: usize) -> (f32, f32) {
        match self.pages.get(page) {
            Some(PageSlot::Imported { page_id, .. }) => self
                .media_box_size(*page_id)
                .unwrap_or((self.page_width, self.page_height)),
            _ => (self.page_width, self.page_height),
        }
    }

    /// Width of `text` in points when set in `font` at `size`.
    pub fn measure_text(&self, text: &str, font: Font, size: f32) -> f32 {
        fonts::measure(text, font, size)
    }

    /// Draw a line of text at `(x, y)` on the given page.
    pub fn draw_text(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
        color: Rgb,
    ) -> Result<()> {
        let encoded = fonts::encode_winansi(text);
        let ops = self.ops_mut(page)?;
        ops.push(Operation::new(
            "rg",
            vec![color.r.into(), color.g.into(), color.b.into()],
        ));
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![font.resource_name().into(), size.into()],
        ));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(encoded)]));
        ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    /// Fill a rectangle with lower-left corner `(x, y)`.
    pub fn draw_rect(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    ) -> Result<()> {
        let ops = self.ops_mut(page)?;
        ops.push(Operation::new(
            "rg",
            vec![color.r.into(), color.g.into(), color.b.into()],
        ));
        ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        ops.push(Operation::new("f", vec![]));
        Ok(())
    }

    /// Stroke a straight line from `(x1, y1)` to `(x2, y2)`.
    pub fn draw_line(
        &mut self,
        page: usize,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    ) -> Result<()> {
        let ops = self.ops_mut(page)?;
        ops.push(Operation::new(
            "RG",
            vec![color.r.into(), color.g.into(), color.b.into()],
        ));
        ops.push(Operation::new("w", vec![width.into()]));
        ops.push(Operation::new("m", vec![x1.into(), y1.into()]));
        ops.push(Operation::new("l", vec![x2.into(), y2.into()]));
        ops.push(Operation::new("S", vec![]));
        Ok(())
    }

    /// Import every page of a source PDF verbatim, in order.
    ///
    /// Returns the output page indices of the imported pages. Inherited page
    /// attributes are materialized onto each page before it leaves its
    /// original tree, so resources and media boxes survive the move.
    pub fn import_pages(&mut self, source: &[u8]) -> Result<Vec<usize>> {
        let mut src = Document::load_mem(source)?;
        if src.is_encrypted() {
            return Err(Error::Encrypted);
        }

        // Shift source object numbers past ours before merging.
        src.renumber_objects_with(self.doc.max_id + 1);

        let src_pages = src.get_pages();
        let mut prepared = Vec::with_capacity(src_pages.len());
        for page_id in src_pages.values() {
            prepared.push((*page_id, materialize_page(&src, *page_id)?));
        }

        self.doc.objects.extend(src.objects);
        self.doc.max_id = self.doc.max_id.max(src.max_id);

        let mut indices = Vec::with_capacity(prepared.len());
        for (page_id, dict) in prepared {
            self.doc.objects.insert(page_id, Object::Dictionary(dict));
            indices.push(self.pages.len());
            self.pages.push(PageSlot::Imported {
                page_id,
                overlay: Vec::new(),
            });
        }

        Ok(indices)
    }

    /// Assemble the page tree and serialize the document.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let pages_tree_id = self.doc.new_object_id();
        let font_dict = self.font_dictionary();
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.page_width.into(),
            self.page_height.into(),
        ];

        let slots = std::mem::take(&mut self.pages);
        let mut kids: Vec<Object> = Vec::with_capacity(slots.len());
        for slot in slots {
            let page_id = match slot {
                PageSlot::Drawn { operations } => {
                    let content = Content { operations };
                    let stream_id = self
                        .doc
                        .add_object(Stream::new(dictionary! {}, content.encode()?));
                    self.doc.add_object(dictionary! {
                        "Type" => "Page",
                        "Parent" => pages_tree_id,
                        "MediaBox" => media_box.clone(),
                        "Contents" => stream_id,
                        "Resources" => dictionary! { "Font" => font_dict.clone() },
                    })
                }
                PageSlot::Imported { page_id, overlay } => {
                    self.finalize_imported(page_id, overlay, pages_tree_id, &font_dict)?
                }
            };
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_tree_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_tree_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        self.doc.prune_objects();
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn ops_mut(&mut self, page: usize) -> Result<&mut Vec<Operation>> {
        match self.pages.get_mut(page) {
            Some(PageSlot::Drawn { operations }) => Ok(operations),
            Some(PageSlot::Imported { overlay, .. }) => Ok(overlay),
            None => Err(Error::Render(format!("page index {} out of range", page))),
        }
    }

    fn font_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for (font, id) in self.font_ids {
            dict.set(font.resource_name(), id);
        }
        dict
    }

    /// Re-parent an imported page and splice the overlay into its contents.
    ///
    /// The original content is wrapped in `q`/`Q` so its graphics state
    /// cannot leak into the overlay operations.
    fn finalize_imported(
        &mut self,
        page_id: ObjectId,
        overlay: Vec<Operation>,
        parent: ObjectId,
        font_dict: &Dictionary,
    ) -> Result<ObjectId> {
        let guard_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));

        let mut suffix_ops = vec![Operation::new("Q", vec![])];
        suffix_ops.extend(overlay);
        let suffix = Content {
            operations: suffix_ops,
        };
        let suffix_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, suffix.encode()?));

        let contents_obj = self.page_dict(page_id)?.get(b"Contents").ok().cloned();
        let existing: Vec<Object> = match contents_obj {
            Some(Object::Reference(id)) => match self.doc.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(items)) => items,
            Some(other) => vec![other],
            None => Vec::new(),
        };

        let mut contents: Vec<Object> = Vec::with_capacity(existing.len() + 2);
        contents.push(guard_id.into());
        contents.extend(existing);
        contents.push(suffix_id.into());

        self.merge_overlay_fonts(page_id, font_dict)?;

        let page = self.page_dict_mut(page_id)?;
        page.set("Parent", parent);
        page.set("Contents", contents);
        Ok(page_id)
    }

    /// Make the overlay fonts visible from an imported page's resources.
    fn merge_overlay_fonts(&mut self, page_id: ObjectId, fonts: &Dictionary) -> Result<()> {
        let resources_obj = self.page_dict(page_id)?.get(b"Resources").ok().cloned();

        match resources_obj {
            Some(Object::Reference(res_id)) => {
                // The resources object may be shared between sibling pages;
                // our font names are unique, so extending it in place leaves
                // the original content untouched.
                let merged = {
                    let res = self
                        .doc
                        .get_object(res_id)
                        .and_then(Object::as_dict)
                        .map_err(|e| Error::Render(format!("page resources: {}", e)))?;
                    self.extended_fonts(res.get(b"Font").ok(), fonts)
                };
                let res = self
                    .doc
                    .objects
                    .get_mut(&res_id)
                    .and_then(|obj| obj.as_dict_mut().ok())
                    .ok_or_else(|| Error::Render("page resources are not a dictionary".into()))?;
                res.set("Font", merged);
            }
            Some(Object::Dictionary(mut res)) => {
                let merged = self.extended_fonts(res.get(b"Font").ok(), fonts);
                res.set("Font", merged);
                self.page_dict_mut(page_id)?.set("Resources", res);
            }
            _ => {
                let mut res = Dictionary::new();
                res.set("Font", fonts.clone());
                self.page_dict_mut(page_id)?.set("Resources", res);
            }
        }
        Ok(())
    }

    /// Clone the page's font dictionary (following one reference hop) and
    /// extend it with the overlay fonts.
    fn extended_fonts(&self, existing: Option<&Object>, ours: &Dictionary) -> Dictionary {
        let mut merged = match existing {
            Some(Object::Dictionary(dict)) => dict.clone(),
            Some(Object::Reference(id)) => self
                .doc
                .get_object(*id)
                .ok()
                .and_then(|obj| obj.as_dict().ok())
                .cloned()
                .unwrap_or_else(Dictionary::new),
            _ => Dictionary::new(),
        };
        for (key, value) in ours.iter() {
            merged.set(key.clone(), value.clone());
        }
        merged
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary> {
        self.doc
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|e| Error::Render(format!("page object {:?}: {}", page_id, e)))
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.doc
            .objects
            .get_mut(&page_id)
            .and_then(|obj| obj.as_dict_mut().ok())
            .ok_or_else(|| Error::Render(format!("page object {:?} is not a dictionary", page_id)))
    }

    fn media_box_size(&self, page_id: ObjectId) -> Option<(f32, f32)> {
        let page = self.doc.get_object(page_id).ok()?.as_dict().ok()?;
        let media_box = match page.get(b"MediaBox").ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_array().ok()?.clone(),
            Object::Array(items) => items.clone(),
            _ => return None,
        };

        let nums: Vec<f32> = media_box.iter().filter_map(object_to_f32).collect();
        if nums.len() != 4 {
            return None;
        }
        Some((nums[2] - nums[0], nums[3] - nums[1]))
    }
}

/// Copy a source page dictionary with its inherited attributes made explicit.
fn materialize_page(src: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let page = src
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| Error::Render(format!("source page {:?}: {}", page_id, e)))?;
    let mut dict = page.clone();

    for key in INHERITED_KEYS {
        if !dict.has(key) {
            if let Some(value) = find_inherited(src, page, key) {
                dict.set(key, value);
            }
        }
    }

    // The page joins the output tree; its parent link is rewritten on save.
    dict.remove(b"Parent");
    Ok(dict)
}

/// Walk the Parent chain looking for an inherited attribute.
///
/// Bounded so a malformed Parent cycle cannot loop forever.
fn find_inherited(src: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut dict = page;
    for _ in 0..32 {
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = src.get_object(parent_id).ok()?.as_dict().ok()?;
    }
    None
}

fn object_to_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
