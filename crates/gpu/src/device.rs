/// Raw identifier of a GPU object as handed out by a [`GpuDevice`].
pub type RawHandle = u32;

/// Sentinel for "no resource". Never returned by a successful create call.
pub const NO_RESOURCE: RawHandle = 0;

/// Which buffer binding point a buffer is created for and bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Kind of GPU object behind a raw handle, so the device knows how to free it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    VertexArray,
    Texture,
}

/// Component layout of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    Sint32x4,
}

impl AttributeFormat {
    pub fn components(self) -> u32 {
        match self {
            Self::Float32x2 => 2,
            Self::Float32x3 => 3,
            Self::Float32x4 | Self::Sint32x4 => 4,
        }
    }

    /// Size in bytes.
    pub fn size(self) -> u32 {
        self.components() * 4
    }
}

/// One named attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub location: u32,
    pub format: AttributeFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

/// Interleaved vertex layout: a stride plus the attributes packed inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// How triangles are rasterised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    /// Edges only.
    Line,
}

/// Pixel format of an uploaded texture, chosen from the decoded channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    /// 1 → single channel, 3 → RGB, 4 → RGBA. Anything else is unsupported.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::R8),
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            Self::R8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Tightly packed 8-bit image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }
}

/// The graphics-context capability.
///
/// Mirrors a stateful immediate-mode context: bind calls select the object
/// that later attribute and draw calls act on. Callers own the ordering.
/// Methods take `&self` so that owning handles can share the device through
/// `Rc`; implementations use interior mutability.
pub trait GpuDevice {
    /// Create a buffer and upload `contents` once.
    fn create_buffer(&self, target: BufferTarget, contents: &[u8]) -> RawHandle;

    /// Create an empty attribute-binding object.
    fn create_vertex_array(&self) -> RawHandle;

    /// Upload `image` and generate its full mipmap chain.
    fn create_texture(&self, image: &TextureImage) -> RawHandle;

    /// Free a resource previously returned by one of the create calls.
    fn release(&self, kind: ResourceKind, handle: RawHandle);

    fn bind_buffer(&self, target: BufferTarget, handle: RawHandle);

    fn bind_vertex_array(&self, handle: RawHandle);

    /// Declare `attribute` on the bound vertex array, sourced from the bound
    /// vertex buffer with the given stride.
    fn vertex_attribute(&self, attribute: VertexAttribute, stride: u32);

    fn bind_texture(&self, unit: u32, handle: RawHandle);

    fn clear(&self, color: [f32; 4]);

    /// Rasterisation mode for every later draw, until changed.
    fn set_polygon_mode(&self, mode: PolygonMode);

    /// Indexed triangle-list draw using the bound vertex array.
    fn draw_indexed(&self, index_count: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_by_channel_count() {
        assert_eq!(PixelFormat::from_channels(1), Some(PixelFormat::R8));
        assert_eq!(PixelFormat::from_channels(3), Some(PixelFormat::Rgb8));
        assert_eq!(PixelFormat::from_channels(4), Some(PixelFormat::Rgba8));
        assert_eq!(PixelFormat::from_channels(2), None);
        assert_eq!(PixelFormat::from_channels(0), None);
        assert_eq!(PixelFormat::from_channels(5), None);
    }

    #[test]
    fn mip_levels_cover_largest_side() {
        let image = |width, height| TextureImage {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: Vec::new(),
        };
        assert_eq!(image(1, 1).mip_level_count(), 1);
        assert_eq!(image(2, 2).mip_level_count(), 2);
        assert_eq!(image(256, 64).mip_level_count(), 9);
        assert_eq!(image(300, 5).mip_level_count(), 9);
    }

    #[test]
    fn attribute_sizes() {
        assert_eq!(AttributeFormat::Float32x2.size(), 8);
        assert_eq!(AttributeFormat::Float32x3.size(), 12);
        assert_eq!(AttributeFormat::Sint32x4.size(), 16);
    }
}
