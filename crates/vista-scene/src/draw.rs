//! Draw traversal and the per-pass drawing context.
//!
//! A frame walks the tree from the root. Widgets draw in pixel space inside
//! their own viewport. A widget hosting world children (an axes) sets up the
//! world projection in [`Behavior::enter_world`]; its world objects are then
//! drawn with their transformation lists applied, followed by the screen
//! phase in which they may draw pixel overlays anchored at projected world
//! positions. Widget children come last.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use glam::{DMat4, DVec3, DVec4};
use vista_engine::coords::Rect;
use vista_engine::device::GpuCaps;
use vista_engine::paint::Color;
use vista_engine::scene::{
    DepthMode, DrawList, DrawState, TexelFormat, TextureData, TextureDesc, TextureDim, TextureId, TextureOp,
};
use vista_engine::text::{FontId, FontSystem};

use crate::error::Result;
use crate::line::markers::{MarkerStyle, Sprite, SpriteCache};
use crate::node::{compose, Behavior, NodeCx, NodeId, Scene};

/// Which rendering of the tree is being produced.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawPass {
    Normal,
    /// Interactive redraw; heavy objects may cut quality.
    Fast,
    /// Off-screen id-colored silhouettes for picking.
    Shape,
    /// Pixel overlays of world objects.
    Screen,
}

/// Depth range used by pixel-space projections for a depth buffer of
/// `depth_bits` precision.
pub fn depth_sentinel(depth_bits: u8) -> f64 {
    if depth_bits <= 16 { 3000.0 } else { 100_000.0 }
}

/// Figure-wide GPU bookkeeping shared by every node of one root.
#[derive(Debug, Default)]
pub struct Resources {
    next_texture: u64,
    pub(crate) sprites: SpriteCache,
    colormaps: HashMap<u64, TextureId>,
}

impl Resources {
    pub fn alloc_texture(&mut self) -> TextureId {
        self.next_texture += 1;
        TextureId(self.next_texture)
    }

    /// Marker sprite for one configuration, generated on first use.
    pub fn sprite(&mut self, list: &mut DrawList, style: MarkerStyle, diameter: f32, edge_width: f32) -> Sprite {
        let next = &mut self.next_texture;
        let mut alloc = || {
            *next += 1;
            TextureId(*next)
        };
        self.sprites.get(list, &mut alloc, style, diameter, edge_width)
    }

    /// Destroy ops for every figure-wide texture.
    pub fn release(&mut self, out: &mut Vec<TextureOp>) {
        self.sprites.release(out);
        out.extend(self.colormaps.drain().map(|(_, id)| TextureOp::Destroy { id }));
    }

    /// Texture holding a colormap lookup table, uploaded once per distinct
    /// table.
    pub fn colormap_texture(&mut self, list: &mut DrawList, table: &[[f32; 4]]) -> TextureId {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for rgba in table {
            for c in rgba {
                c.to_bits().hash(&mut hasher);
            }
        }
        let key = hasher.finish();
        if let Some(&id) = self.colormaps.get(&key) {
            return id;
        }
        let id = self.alloc_texture();
        let data = table
            .iter()
            .flat_map(|rgba| rgba.iter().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect();
        let desc = TextureDesc {
            dim: TextureDim::D2,
            size: [table.len().max(1) as u32, 1, 1],
            format: TexelFormat::Rgba8,
            linear: true,
        };
        list.push_texture_op(TextureOp::Create { id, desc, data: TextureData::U8(data) });
        self.colormaps.insert(key, id);
        id
    }
}

#[derive(Debug, Copy, Clone)]
struct Saved {
    viewport: Rect,
    projection: DMat4,
    modelview: DMat4,
    pass: DrawPass,
}

/// Everything a behavior needs to record draw commands.
///
/// Keeps the projection and modelview in double precision with a stack the
/// traversal pushes and pops around every node.
pub struct DrawContext<'a> {
    pub list: &'a mut DrawList,
    pub resources: &'a mut Resources,
    fonts: &'a FontSystem,
    font: FontId,
    caps: GpuCaps,
    pass: DrawPass,
    fast: bool,
    depth: f64,
    viewport: Rect,
    projection: DMat4,
    modelview: DMat4,
    stack: Vec<Saved>,
    shape_color: Color,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        list: &'a mut DrawList,
        resources: &'a mut Resources,
        fonts: &'a FontSystem,
        font: FontId,
        caps: GpuCaps,
        pass: DrawPass,
    ) -> Self {
        Self {
            list,
            resources,
            fonts,
            font,
            caps,
            pass,
            fast: pass == DrawPass::Fast,
            depth: depth_sentinel(caps.depth_bits),
            viewport: Rect::default(),
            projection: DMat4::IDENTITY,
            modelview: DMat4::IDENTITY,
            stack: Vec::new(),
            shape_color: Color::BLACK,
        }
    }

    pub fn pass(&self) -> DrawPass {
        self.pass
    }

    /// The frame is a fast (interactive) one, including its screen phase.
    pub fn is_fast(&self) -> bool {
        self.fast
    }

    pub fn is_shape(&self) -> bool {
        self.pass == DrawPass::Shape
    }

    pub fn caps(&self) -> &GpuCaps {
        &self.caps
    }

    pub fn fonts(&self) -> &'a FontSystem {
        self.fonts
    }

    pub fn font(&self) -> FontId {
        self.font
    }

    pub fn depth_sentinel(&self) -> f64 {
        self.depth
    }

    /// Pixel-space z for a depth value in `[0, 1]`.
    pub fn depth_to_z(&self, d: f64) -> f32 {
        (self.depth - 2.0 * self.depth * d) as f32
    }

    pub fn push(&mut self) {
        self.stack.push(Saved {
            viewport: self.viewport,
            projection: self.projection,
            modelview: self.modelview,
            pass: self.pass,
        });
    }

    pub fn pop(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.viewport = s.viewport;
            self.projection = s.projection;
            self.modelview = s.modelview;
            self.pass = s.pass;
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn projection(&self) -> DMat4 {
        self.projection
    }

    pub fn set_projection(&mut self, m: DMat4) {
        self.projection = m;
    }

    pub fn modelview(&self) -> DMat4 {
        self.modelview
    }

    pub fn set_modelview(&mut self, m: DMat4) {
        self.modelview = m;
    }

    pub fn multiply_modelview(&mut self, m: DMat4) {
        self.modelview *= m;
    }

    /// Orthographic pixel projection over the current viewport, +Y down.
    pub fn set_pixel_projection(&mut self) {
        let (w, h) = (self.viewport.w.max(1.0) as f64, self.viewport.h.max(1.0) as f64);
        self.projection = DMat4::orthographic_rh_gl(0.0, w, h, 0.0, -self.depth, self.depth);
        self.modelview = DMat4::IDENTITY;
    }

    /// State for geometry in the current world coordinates.
    pub fn world_state(&self) -> DrawState {
        DrawState::new((self.projection * self.modelview).as_mat4(), self.viewport).with_depth(DepthMode::TestWrite)
    }

    /// State for geometry in pixels relative to the viewport's top-left.
    pub fn pixel_state(&self) -> DrawState {
        DrawState::pixels(self.viewport, self.depth as f32)
    }

    /// Projects a world point to viewport pixels (+Y down) with depth in
    /// `[0, 1]`; `None` behind the eye.
    pub fn project(&self, p: DVec3) -> Option<DVec3> {
        let clip = self.projection * self.modelview * p.extend(1.0);
        if clip.w <= f64::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(DVec3::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.w as f64,
            (1.0 - ndc.y) * 0.5 * self.viewport.h as f64,
            (ndc.z + 1.0) * 0.5,
        ))
    }

    /// Inverse of [`DrawContext::project`].
    pub fn unproject(&self, x: f64, y: f64, depth: f64) -> Option<DVec3> {
        let inv = (self.projection * self.modelview).inverse();
        let ndc = DVec4::new(
            2.0 * x / self.viewport.w.max(1.0) as f64 - 1.0,
            1.0 - 2.0 * y / self.viewport.h.max(1.0) as f64,
            2.0 * depth - 1.0,
            1.0,
        );
        let p = inv * ndc;
        (p.w.abs() > f64::EPSILON && p.is_finite()).then(|| p.truncate() / p.w)
    }

    pub fn sprite(&mut self, style: MarkerStyle, diameter: f32, edge_width: f32) -> Sprite {
        self.resources.sprite(self.list, style, diameter, edge_width)
    }

    /// Colormap texture for a 256-entry table.
    pub fn colormap(&mut self, table: &[[f32; 4]]) -> TextureId {
        self.resources.colormap_texture(self.list, table)
    }

    pub fn shape_color(&self) -> Color {
        self.shape_color
    }

    pub(crate) fn set_shape_color(&mut self, color: Color) {
        self.shape_color = color;
    }

    /// `color` in drawing passes, the node's id color in the shape pass.
    pub fn paint(&self, color: Color) -> Color {
        if self.is_shape() { self.shape_color } else { color }
    }
}

type Hook = fn(&mut dyn Behavior, NodeCx<'_>, &mut DrawContext<'_>) -> Result<()>;

/// Runs one draw hook; a failing node is logged once and queued in `failed`.
fn run_hook(scene: &mut Scene, id: NodeId, ctx: &mut DrawContext<'_>, hook: Hook, failed: &mut Vec<NodeId>) {
    let Some(res) = scene.with_behavior(id, |b, cx| hook(b, cx, ctx)) else { return };
    if let Err(e) = res {
        if let Some(node) = scene.get_mut(id) {
            if !node.draw_failed {
                log::error!("drawing {} {id} failed: {e}; it will be removed", node.type_name());
                node.draw_failed = true;
            }
        }
        if !failed.contains(&id) {
            failed.push(id);
        }
    }
}

fn normal_hook(b: &mut dyn Behavior, cx: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
    b.on_draw(cx, ctx)
}

fn shape_hook(b: &mut dyn Behavior, cx: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
    b.on_draw_shape(cx, ctx)
}

fn screen_hook(b: &mut dyn Behavior, cx: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
    b.on_draw_screen(cx, ctx)
}

fn hook_for(pass: DrawPass) -> Hook {
    match pass {
        DrawPass::Shape => shape_hook,
        DrawPass::Screen => screen_hook,
        DrawPass::Normal | DrawPass::Fast => normal_hook,
    }
}

/// Draws the whole tree into `ctx`; returns the nodes whose hooks failed.
pub(crate) fn draw_tree(scene: &mut Scene, ctx: &mut DrawContext<'_>, id_color: &dyn Fn(u32) -> Color) -> Vec<NodeId> {
    let mut failed = Vec::new();
    let root = scene.root();
    draw_widget(scene, root, ctx, id_color, &mut failed);
    failed
}

fn prepare_shape(scene: &Scene, id: NodeId, ctx: &mut DrawContext<'_>, id_color: &dyn Fn(u32) -> Color) -> bool {
    let Some(node) = scene.get(id) else { return false };
    match (node.hit_test, node.draw_id) {
        (true, Some(d)) => {
            ctx.set_shape_color(id_color(d));
            true
        }
        _ => false,
    }
}

fn draw_widget(
    scene: &mut Scene,
    id: NodeId,
    ctx: &mut DrawContext<'_>,
    id_color: &dyn Fn(u32) -> Color,
    failed: &mut Vec<NodeId>,
) {
    if !scene.get(id).is_some_and(|n| n.visible) {
        return;
    }
    ctx.push();
    ctx.set_viewport(scene.rect(id));
    ctx.set_pixel_projection();
    let pass = ctx.pass();
    if pass != DrawPass::Shape || prepare_shape(scene, id, ctx, id_color) {
        run_hook(scene, id, ctx, hook_for(pass), failed);
    }

    let children = scene.children(id).to_vec();
    let (world, widgets): (Vec<NodeId>, Vec<NodeId>) =
        children.into_iter().partition(|&c| scene.get(c).is_some_and(|n| n.is_world()));
    if !world.is_empty() {
        ctx.push();
        let entered = scene.with_behavior(id, |b, cx| b.enter_world(cx, ctx)).unwrap_or(false);
        if entered {
            for &c in &world {
                draw_world(scene, c, ctx, id_color, failed);
            }
            if pass != DrawPass::Shape {
                ctx.push();
                ctx.pass = DrawPass::Screen;
                for &c in &world {
                    draw_world(scene, c, ctx, id_color, failed);
                }
                ctx.pop();
            }
        }
        ctx.pop();
    }
    for c in widgets {
        draw_widget(scene, c, ctx, id_color, failed);
    }
    ctx.pop();
}

fn draw_world(
    scene: &mut Scene,
    id: NodeId,
    ctx: &mut DrawContext<'_>,
    id_color: &dyn Fn(u32) -> Color,
    failed: &mut Vec<NodeId>,
) {
    let Some(node) = scene.get(id) else { return };
    if !node.visible {
        return;
    }
    let m = compose(node.transforms());
    ctx.push();
    ctx.multiply_modelview(m);
    let pass = ctx.pass();
    if pass != DrawPass::Shape || prepare_shape(scene, id, ctx, id_color) {
        run_hook(scene, id, ctx, hook_for(pass), failed);
    }
    for c in scene.children(id).to_vec() {
        draw_world(scene, c, ctx, id_color, failed);
    }
    ctx.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VistaError;
    use crate::node::{Position, Transform};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
        world: bool,
        fail: bool,
    }

    impl Behavior for Recorder {
        fn type_name(&self) -> &'static str {
            "Recorder"
        }

        fn on_draw(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:{:?}", self.name, ctx.pass()));
            if self.fail {
                return Err(VistaError::invalid("broken"));
            }
            Ok(())
        }

        fn on_draw_shape(&mut self, _node: NodeCx<'_>, ctx: &mut DrawContext<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:shape:{:?}", self.name, ctx.shape_color().to_rgb8()));
            Ok(())
        }

        fn on_draw_screen(&mut self, _node: NodeCx<'_>, _ctx: &mut DrawContext<'_>) -> Result<()> {
            self.log.borrow_mut().push(format!("{}:screen", self.name));
            Ok(())
        }

        fn enter_world(&mut self, _node: NodeCx<'_>, _ctx: &mut DrawContext<'_>) -> bool {
            self.world
        }
    }

    fn rec(name: &'static str, log: &Log, world: bool) -> Box<dyn Behavior> {
        Box::new(Recorder { name, log: log.clone(), world, fail: false })
    }

    fn run(scene: &mut Scene, pass: DrawPass) -> Vec<NodeId> {
        let mut list = DrawList::new();
        let mut res = Resources::default();
        let fonts = FontSystem::new();
        let mut ctx = DrawContext::new(&mut list, &mut res, &fonts, FontId::default(), GpuCaps::desktop(), pass);
        draw_tree(scene, &mut ctx, &|d| Color::from_rgb8([d as u8, 0, 0]))
    }

    // ── traversal ─────────────────────────────────────────────────────────

    #[test]
    fn world_then_screen_then_widgets() {
        let log: Log = Rc::default();
        let mut s = Scene::new(None, (100.0, 100.0));
        let axes = s.add_widget(s.root(), Position::fill(), rec("axes", &log, true)).unwrap();
        s.add_world(axes, rec("line", &log, false)).unwrap();
        s.add_widget(axes, Position::fill(), rec("label", &log, false)).unwrap();
        run(&mut s, DrawPass::Normal);
        assert_eq!(*log.borrow(), vec!["axes:Normal", "line:Normal", "line:screen", "label:Normal"]);
    }

    #[test]
    fn world_children_skipped_without_world_host() {
        let log: Log = Rc::default();
        let mut s = Scene::new(None, (100.0, 100.0));
        let b = s.add_widget(s.root(), Position::fill(), rec("box", &log, false)).unwrap();
        s.add_world(b, rec("line", &log, false)).unwrap();
        run(&mut s, DrawPass::Fast);
        assert_eq!(*log.borrow(), vec!["box:Fast"]);
    }

    #[test]
    fn hidden_nodes_and_subtrees_are_skipped() {
        let log: Log = Rc::default();
        let mut s = Scene::new(None, (100.0, 100.0));
        let a = s.add_widget(s.root(), Position::fill(), rec("a", &log, false)).unwrap();
        s.add_widget(a, Position::fill(), rec("b", &log, false)).unwrap();
        s.set_visible(a, false).unwrap();
        run(&mut s, DrawPass::Normal);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn shape_pass_only_draws_hit_testable_nodes() {
        let log: Log = Rc::default();
        let mut s = Scene::new(None, (100.0, 100.0));
        let axes = s.add_widget(s.root(), Position::fill(), rec("axes", &log, true)).unwrap();
        let line = s.add_world(axes, rec("line", &log, false)).unwrap();
        s.add_world(axes, rec("quiet", &log, false)).unwrap();
        s.set_hit_test(line, true).unwrap();
        s.set_draw_id(line, Some(5));
        run(&mut s, DrawPass::Shape);
        assert_eq!(*log.borrow(), vec!["line:shape:[5, 0, 0]"]);
    }

    #[test]
    fn failing_node_is_reported_once() {
        let log: Log = Rc::default();
        let mut s = Scene::new(None, (100.0, 100.0));
        let bad = s
            .add_widget(s.root(), Position::fill(), Box::new(Recorder { name: "bad", log: log.clone(), world: false, fail: true }))
            .unwrap();
        assert_eq!(run(&mut s, DrawPass::Normal), vec![bad]);
        assert!(s.node(bad).unwrap().draw_failed);
    }

    // ── context ───────────────────────────────────────────────────────────

    #[test]
    fn depth_sentinel_follows_precision() {
        assert_eq!(depth_sentinel(16), 3000.0);
        assert_eq!(depth_sentinel(24), 100_000.0);
    }

    #[test]
    fn depth_to_z_spans_sentinel() {
        let mut list = DrawList::new();
        let mut res = Resources::default();
        let fonts = FontSystem::new();
        let ctx = DrawContext::new(&mut list, &mut res, &fonts, FontId::default(), GpuCaps::desktop(), DrawPass::Normal);
        assert_eq!(ctx.depth_to_z(0.0), 100_000.0);
        assert_eq!(ctx.depth_to_z(0.5), 0.0);
        assert_eq!(ctx.depth_to_z(1.0), -100_000.0);
    }

    #[test]
    fn project_and_unproject_agree() {
        let mut list = DrawList::new();
        let mut res = Resources::default();
        let fonts = FontSystem::new();
        let mut ctx = DrawContext::new(&mut list, &mut res, &fonts, FontId::default(), GpuCaps::desktop(), DrawPass::Normal);
        ctx.set_viewport(Rect::new(0.0, 0.0, 200.0, 100.0));
        ctx.set_projection(DMat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, -10.0, 10.0));
        ctx.multiply_modelview(Transform::Scale(DVec3::splat(0.5)).matrix());
        let p = ctx.project(DVec3::new(1.0, 1.0, 0.0)).unwrap();
        assert!((p.x - 150.0).abs() < 1e-9 && (p.y - 25.0).abs() < 1e-9);
        let back = ctx.unproject(p.x, p.y, p.z).unwrap();
        assert!((back - DVec3::new(1.0, 1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn colormap_textures_are_shared_by_table() {
        let mut list = DrawList::new();
        let mut res = Resources::default();
        let table = [[0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0]];
        let a = res.colormap_texture(&mut list, &table);
        let b = res.colormap_texture(&mut list, &table);
        assert_eq!(a, b);
        assert_eq!(list.texture_ops().len(), 1);
    }
}
