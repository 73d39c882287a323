use vista_engine::logging::LoggingConfig;
use vista_math::{Aarray, Pointset};
use vista_scene::prelude::*;

fn main() -> anyhow::Result<()> {
    let mut app = Application::new()
        .title("Vista Studio")
        .size(960.0, 480.0)
        .logging(LoggingConfig::with_filter("info,wgpu=warn"));
    if let Some(font) = load_font() {
        app = app.font(font);
    }
    app.run(|figure| {
        let root = figure.root();

        // ── line plot ─────────────────────────────────────────────────────
        let plot = figure.add_axes_in(root, half(0.0))?;
        figure.add_object(plot, Line::new(&wave(|x| x.sin())?).with_format("b-")?)?;
        figure.add_object(plot, Line::new(&wave(|x| 0.5 * (2.0 * x).cos())?).with_format("r:o")?)?;
        {
            let style = figure.axes_mut(plot)?.axis_style_mut();
            style.labels[0] = "time (s)".to_string();
            style.labels[1] = "amplitude".to_string();
            style.show_grid = [true, true, false];
        }
        figure.set_limits(plot, LIMIT_MARGIN)?;
        title(figure, plot, "Waves")?;

        // ── volume ────────────────────────────────────────────────────────
        let view = figure.add_axes_in(root, half(0.5))?;
        figure.axes_mut(view)?.set_camera_type("3d")?;
        let mut volume = Texture3D::new(blob(48)?)?;
        volume.set_colormap(&Colormap::preset("hot")?.get_map())?;
        volume.set_clim(Range::new(0.0, 0.8))?;
        figure.add_object(view, volume)?;
        figure.set_limits(view, 0.0)?;
        title(figure, view, "Gaussian blob (MIP)")?;

        log::info!("drag to pan or rotate, scroll to zoom, double-click to reset");
        Ok(())
    })
}

/// Left or right half of the window.
fn half(x: f32) -> Position {
    Position::from_fields([Field::Fraction(x), Field::Pixels(0.0), Field::Fraction(0.5), Field::Fraction(1.0)])
}

/// Docks a title above an axes.
fn title(figure: &mut Figure, axes: NodeId, text: &str) -> Result<()> {
    let container = figure.scene().parent(axes).ok_or(VistaError::DestroyedNode(axes))?;
    figure.add_widget(container, Title::position(), Title::new(text))?;
    Ok(())
}

fn wave(f: impl Fn(f32) -> f32) -> Result<Pointset> {
    let flat: Vec<f32> = (0..=200)
        .flat_map(|i| {
            let x = i as f32 * 0.05;
            [x, f(x)]
        })
        .collect();
    Ok(Pointset::from_flat(2, &flat)?)
}

/// `n`³ Gaussian centered in the cube.
fn blob(n: usize) -> Result<Aarray<f32>> {
    let c = (n as f32 - 1.0) / 2.0;
    let s2 = (n as f32 / 5.0).powi(2);
    let data = (0..n * n * n)
        .map(|i| {
            let (z, y, x) = ((i / (n * n)) as f32, ((i / n) % n) as f32, (i % n) as f32);
            let d2 = (x - c).powi(2) + (y - c).powi(2) + (z - c).powi(2);
            (-d2 / (2.0 * s2)).exp()
        })
        .collect();
    Ok(Aarray::new(data, vec![n, n, n])?)
}

fn load_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}
