use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde::ser::SerializeStruct;

use crate::assets::svg_raster::load_svg;

/// Premultiplied RGBA8 pixels of a loaded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageData {
    /// Zero-sized placeholder standing in for an image that failed to load.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            rgba8_premul: Arc::new(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

struct ImageSlot {
    pointer: String,
    data: OnceLock<ImageData>,
}

/// Shared handle to an inline image declared in the style document.
///
/// Handles exist before their pixels do: until the matching [`ImageLoad`] settles, the image
/// renders as blank. Clones share the slot and compare equal by identity.
#[derive(Clone)]
pub struct ImageHandle(Arc<ImageSlot>);

impl ImageHandle {
    pub(crate) fn pending(pointer: impl Into<String>) -> Self {
        Self(Arc::new(ImageSlot {
            pointer: pointer.into(),
            data: OnceLock::new(),
        }))
    }

    /// Document pointer the image was declared at.
    pub fn pointer(&self) -> &str {
        &self.0.pointer
    }

    pub fn is_loaded(&self) -> bool {
        self.0.data.get().is_some()
    }

    pub fn data(&self) -> Option<&ImageData> {
        self.0.data.get()
    }

    /// `(width, height)` once loaded.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.data().map(|d| (d.width, d.height))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("pointer", &self.0.pointer)
            .field("size", &self.size())
            .finish()
    }
}

impl Serialize for ImageHandle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (width, height) = self.size().unwrap_or((0, 0));
        let mut s = serializer.serialize_struct("ImageHandle", 4)?;
        s.serialize_field("pointer", self.pointer())?;
        s.serialize_field("loaded", &self.is_loaded())?;
        s.serialize_field("width", &width)?;
        s.serialize_field("height", &height)?;
        s.end()
    }
}

/// An in-flight image load; settling it fills the handle's pixels.
pub struct ImageLoad {
    handle: ImageHandle,
    source: String,
}

impl ImageLoad {
    pub(crate) fn new(handle: ImageHandle, source: String) -> Self {
        Self { handle, source }
    }

    pub fn handle(&self) -> &ImageHandle {
        &self.handle
    }

    /// Rasterize the source into the handle. A failed load leaves an empty placeholder so
    /// compilation still completes. Returns whether the image loaded.
    pub fn run(self) -> bool {
        let (data, ok) = match load_svg(&self.source) {
            Ok(data) => (data, true),
            Err(err) => {
                tracing::warn!(pointer = self.handle.pointer(), error = %err, "unable to load image");
                (ImageData::empty(), false)
            }
        };
        // A handle is only ever settled by its own load.
        let _ = self.handle.0.data.set(data);
        ok
    }
}

impl fmt::Debug for ImageLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoad")
            .field("pointer", &self.handle.pointer())
            .field("source_len", &self.source.len())
            .finish()
    }
}

/// Inline SVG markup, as opposed to any other string value.
pub fn is_svg_markup(v: &serde_json::Value) -> bool {
    v.as_str().is_some_and(|s| {
        s.trim_start()
            .get(..4)
            .is_some_and(|head| head.eq_ignore_ascii_case("<svg"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image.rs"]
mod tests;
