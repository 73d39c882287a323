//! Round trips that must not change anything, and uploads at the edges of
//! what a device can hold.

mod common;

use glam::DVec3;
use vista_engine::device::GpuCaps;
use vista_engine::scene::{TexelFormat, TextureDim, TextureOp};
use vista_math::{Aarray, Range};
use vista_scene::camera::CameraKind;
use vista_scene::node::NodeId;
use vista_scene::texture::{Texture2D, Texture3D};

use common::{harness, harness_with, volume_commands, Harness};

fn image(w: usize, h: usize) -> Texture2D {
    let data: Vec<f32> = (0..w * h).map(|i| i as f32).collect();
    Texture2D::new(Aarray::new(data, vec![h, w]).unwrap()).unwrap()
}

fn with_image(h: &mut Harness, tex: Texture2D) -> (NodeId, NodeId) {
    let axes = h.figure.add_axes().unwrap();
    let id = h.figure.add_object(axes, tex).unwrap();
    h.figure.set_limits(axes, 0.0).unwrap();
    (axes, id)
}

fn created(h: &Harness) -> Vec<[u32; 3]> {
    h.log
        .borrow()
        .frames
        .iter()
        .flat_map(|f| f.texture_ops().iter())
        .filter_map(|op| match op {
            // Data textures only; colormaps are byte tables.
            TextureOp::Create { desc, .. } if desc.dim == TextureDim::D2 && desc.format == TexelFormat::R32F => Some(desc.size),
            _ => None,
        })
        .collect()
}

// ── round trips ───────────────────────────────────────────────────────────

#[test]
fn restoring_view_params_changes_nothing() {
    let mut h = harness();
    let (axes, _) = with_image(&mut h, image(8, 4));
    let a = h.figure.axes_mut(axes).unwrap();
    a.set_camera_kind(CameraKind::TwoD);
    let p = a.view_params();
    let probe = DVec3::new(3.0, 2.0, 0.0);
    let before = a.world_to_screen(probe).unwrap();
    a.set_view_params(&p);
    assert_eq!(a.view_params(), p);
    assert_eq!(a.world_to_screen(probe).unwrap(), before);
}

#[test]
fn colormap_set_to_its_own_map_is_unchanged() {
    let mut t = image(4, 4);
    let table = t.colormap().table().to_vec();
    let own = t.colormap().get_map();
    t.set_colormap(&own).unwrap();
    assert_eq!(t.colormap().table(), table.as_slice());
}

#[test]
fn same_data_twice_uploads_once() {
    let mut h = harness();
    let (_, id) = with_image(&mut h, image(8, 4));
    h.figure.paint().unwrap();
    let data: Vec<f32> = (0..32).map(|i| i as f32).collect();
    let t = h.figure.scene_mut().behavior_mut::<Texture2D>(id).unwrap();
    t.set_data(Aarray::new(data, vec![4, 8]).unwrap()).unwrap();
    h.figure.paint().unwrap();

    let tex = h.figure.scene().behavior::<Texture2D>(id).unwrap().texture();
    assert_eq!((tex.creates(), tex.updates()), (1, 1));
    let log = h.log.borrow();
    assert!(log.frames[1].texture_ops().iter().any(|op| matches!(op, TextureOp::Update { .. })));
}

#[test]
fn second_destroy_is_a_noop() {
    let mut h = harness();
    let (axes, id) = with_image(&mut h, image(2, 2));
    h.figure.paint().unwrap();
    assert_eq!(h.figure.destroy(id), vec![id]);
    assert!(h.figure.destroy(id).is_empty());
    // The release rides on the next frame.
    h.figure.paint().unwrap();
    let log = h.log.borrow();
    assert!(log.frames[1].texture_ops().iter().any(|op| matches!(op, TextureOp::Destroy { .. })));
    assert!(h.figure.scene().contains(axes));
}

// ── boundaries ────────────────────────────────────────────────────────────

#[test]
fn single_texel_uploads_without_padding() {
    let mut h = harness();
    with_image(&mut h, image(1, 1));
    h.figure.paint().unwrap();
    assert_eq!(created(&h), vec![[1, 1, 1]]);
}

#[test]
fn oversized_texture_is_downsampled_to_fit() {
    let caps = GpuCaps { max_texture_2d: 16, ..GpuCaps::desktop() };
    let mut h = harness_with(caps);
    let (_, id) = with_image(&mut h, image(17, 17));
    h.figure.paint().unwrap();
    let sizes = created(&h);
    assert_eq!(sizes.len(), 1);
    assert!(sizes[0][0] <= 16 && sizes[0][1] <= 16);
    let up = h.figure.scene().behavior::<Texture2D>(id).unwrap().texture().uploaded().unwrap();
    assert_eq!(up.downsamples, 1);
}

#[test]
fn volumes_are_skipped_without_3d_textures() {
    let caps = GpuCaps { textures_3d: false, ..GpuCaps::desktop() };
    let mut h = harness_with(caps);
    let axes = h.figure.add_axes().unwrap();
    let data = vec![0.5f32; 8];
    let vol = h.figure.add_object(axes, Texture3D::new(Aarray::new(data, vec![2, 2, 2]).unwrap()).unwrap()).unwrap();
    h.figure.paint().unwrap();
    h.figure.paint().unwrap();
    assert!(h.figure.scene().contains(vol));
    let log = h.log.borrow();
    assert!(log.frames.iter().all(|f| volume_commands(f).is_empty()));
}

#[test]
fn collapsed_x_limits_keep_a_usable_view() {
    let mut h = harness();
    let axes = h.figure.add_axes().unwrap();
    h.figure.set_limits_to(axes, Range::new(2.0, 2.0), Range::new(0.0, 1.0), None).unwrap();
    assert_eq!(h.figure.axes(axes).unwrap().limits()[0].range(), 0.0);
    h.figure.paint().unwrap();
    let v = h.figure.axes(axes).unwrap().view_params();
    assert!(v.zoom.0 > 0.0 && v.zoom.0.is_finite());
}
