//! Drawable geometry seam

use crate::render::api::{GraphicsContext, VertexArrayId};

/// Something that can bind its buffers and issue an indexed draw
///
/// The pipeline only borrows geometry; it never frees or mutates it.
pub trait Geometry {
    /// Bind and issue exactly one draw submission
    fn draw(&self, ctx: &dyn GraphicsContext);
}

/// Vertex array with an element buffer of `index_count` indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedGeometry {
    /// Vertex array holding the vertex and index buffers
    pub vertex_array: VertexArrayId,
    /// Number of indices to draw
    pub index_count: u32,
}

impl IndexedGeometry {
    /// Wrap an uploaded vertex array
    pub fn new(vertex_array: VertexArrayId, index_count: u32) -> Self {
        Self { vertex_array, index_count }
    }
}

impl Geometry for IndexedGeometry {
    fn draw(&self, ctx: &dyn GraphicsContext) {
        ctx.draw_indexed(self.vertex_array, self.index_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::Viewport;
    use crate::render::backends::HeadlessContext;

    #[test]
    fn test_draw_issues_one_submission() {
        let ctx = HeadlessContext::new(Viewport::from_size(64, 64));
        let cube = IndexedGeometry::new(ctx.create_vertex_array(), 36);

        cube.draw(&ctx);

        let draws = ctx.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertex_array, cube.vertex_array);
        assert_eq!(draws[0].index_count, 36);
    }
}
