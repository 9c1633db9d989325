//! PNG rendering of scatter plots and correlation heatmaps.
//!
//! Text uses the 8x8 bitmap glyphs from `font8x8`, so rendering needs no
//! font files on the host.

use super::error::AnalysisError;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use palette::{FromColor, Lch, LinSrgb, Srgb};
use std::path::Path;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;
const MARGIN_LEFT: u32 = 72;
const MARGIN_RIGHT: u32 = 24;
const MARGIN_TOP: u32 = 60;
const MARGIN_BOTTOM: u32 = 50;
const GRID_LINES: u32 = 5;
const POINT_RADIUS: i64 = 3;
const DASH: u32 = 8;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const POINT: Rgb<u8> = Rgb([31, 119, 180]);
const TREND: Rgb<u8> = Rgb([214, 39, 40]);
const MISSING: Rgb<u8> = Rgb([160, 160, 160]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const TEXT_ON_DARK: Rgb<u8> = Rgb([255, 255, 255]);

/// Glyph edge in pixels at scale 1.
const GLYPH: i64 = 8;

/// Heatmap cell edge in pixels.
const CELL: u32 = 60;
/// Room for row labels on the left and the title plus column labels on top.
const LABEL_AREA: u32 = 80;
const HEADER: u32 = 56;
const LEGEND_GAP: u32 = 10;
const LEGEND_WIDTH: u32 = 20;
const LEGEND_LABELS: u32 = 40;

/// Text drawn around a scatter plot.
#[derive(Debug, Clone, Default)]
pub struct ScatterLabels {
    /// Large first line, e.g. `CBO_MEAN vs STARS`.
    pub title: String,
    /// Second line, usually the coefficients.
    pub subtitle: String,
    pub x_axis: String,
    pub y_axis: String,
}

/// File name of the chart for one analysed pair.
#[must_use]
pub fn chart_file_name(dependent: &str, independent: &str) -> String {
    format!("analise_{dependent}_vs_{independent}.png")
}

/// Inclusive data range of one axis, widened when degenerate.
#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }
        if min == max {
            return Self {
                min: min - 1.0,
                max: max + 1.0,
            };
        }
        let pad = (max - min) * 0.05;
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Maps data coordinates into the plot area.
struct Plot {
    x: Range,
    y: Range,
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl Plot {
    fn new(points: &[(f64, f64)]) -> Self {
        Self {
            x: Range::of(points.iter().map(|p| p.0)),
            y: Range::of(points.iter().map(|p| p.1)),
            left: i64::from(MARGIN_LEFT),
            right: i64::from(WIDTH - MARGIN_RIGHT),
            top: i64::from(MARGIN_TOP),
            bottom: i64::from(HEIGHT - MARGIN_BOTTOM),
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let px = self.left as f64 + self.x.fraction(x) * (self.right - self.left) as f64;
        let py = self.bottom as f64 - self.y.fraction(y) * (self.bottom - self.top) as f64;
        (px.round() as i64, py.round() as i64)
    }

    fn contains(&self, (x, y): (i64, i64)) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Draws a labelled scatter plot with grid, tick values, axes and an
/// optional dashed trend line `y = slope * x + intercept`, and saves it as
/// PNG.
///
/// # Errors
///
/// Returns [`AnalysisError::Chart`] if the image cannot be saved.
pub fn render_scatter(
    points: &[(f64, f64)],
    trend: Option<(f64, f64)>,
    labels: &ScatterLabels,
    path: &Path,
) -> Result<(), AnalysisError> {
    let mut image = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let plot = Plot::new(points);

    for i in 0..=GRID_LINES {
        let step = i64::from(i);
        let steps = i64::from(GRID_LINES);
        let x = plot.left + (plot.right - plot.left) * step / steps;
        let y = plot.top + (plot.bottom - plot.top) * step / steps;
        draw_line(&mut image, (x, plot.top), (x, plot.bottom), GRID, Some(DASH / 2), None);
        draw_line(&mut image, (plot.left, y), (plot.right, y), GRID, Some(DASH / 2), None);

        let fraction = f64::from(i) / f64::from(GRID_LINES);
        let x_value = plot.x.min + (plot.x.max - plot.x.min) * fraction;
        let y_value = plot.y.max - (plot.y.max - plot.y.min) * fraction;
        draw_text_centered(&mut image, x, plot.bottom + 6, &format_tick(x_value), TEXT, 1);
        let tick = format_tick(y_value);
        draw_text(&mut image, (plot.left - 6 - text_width(&tick, 1), y - GLYPH / 2), &tick, TEXT, 1);
    }

    draw_line(&mut image, (plot.left, plot.bottom), (plot.right, plot.bottom), AXIS, None, None);
    draw_line(&mut image, (plot.left, plot.top), (plot.left, plot.bottom), AXIS, None, None);

    for &(x, y) in points {
        let (cx, cy) = plot.to_pixel(x, y);
        for dy in -POINT_RADIUS..=POINT_RADIUS {
            for dx in -POINT_RADIUS..=POINT_RADIUS {
                if dx * dx + dy * dy <= POINT_RADIUS * POINT_RADIUS {
                    put(&mut image, (cx + dx, cy + dy), POINT);
                }
            }
        }
    }

    if let Some((slope, intercept)) = trend {
        let from = plot.to_pixel(plot.x.min, slope * plot.x.min + intercept);
        let to = plot.to_pixel(plot.x.max, slope * plot.x.max + intercept);
        for offset in 0..2 {
            draw_line(
                &mut image,
                (from.0, from.1 + offset),
                (to.0, to.1 + offset),
                TREND,
                Some(DASH),
                Some(&plot),
            );
        }
    }

    let center = i64::from(WIDTH) / 2;
    draw_text_centered(&mut image, center, 8, &labels.title, TEXT, 2);
    draw_text_centered(&mut image, center, 30, &labels.subtitle, TEXT, 1);
    draw_text(&mut image, (8, plot.top - 18), &labels.y_axis, TEXT, 1);
    let x_axis_center = (plot.left + plot.right) / 2;
    draw_text_centered(&mut image, x_axis_center, plot.bottom + 26, &labels.x_axis, TEXT, 1);

    save(&image, path)
}

/// Draws a correlation matrix as coloured cells, blue for -1 through white
/// to red for +1, with row and column labels, the coefficient in each cell
/// and a labelled legend strip. `None` cells are grey and read `n/a`.
///
/// # Errors
///
/// Returns [`AnalysisError::Chart`] if the image cannot be saved.
pub fn render_heatmap(
    matrix: &[Vec<Option<f64>>],
    labels: &[String],
    title: &str,
    path: &Path,
) -> Result<(), AnalysisError> {
    let n = matrix.len().max(1) as u32;
    let side = n * CELL;
    let legend_x = LABEL_AREA + side + LEGEND_GAP;
    let title_width = u32::try_from(text_width(title, 1)).unwrap_or(0) + 16;
    let width = (legend_x + LEGEND_WIDTH + LEGEND_LABELS).max(title_width);
    let height = HEADER + side + 10;
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let gradient = Gradient::diverging();

    draw_text_centered(&mut image, i64::from(width) / 2, 8, title, TEXT, 1);

    for (index, label) in labels.iter().enumerate().take(n as usize) {
        let offset = i64::from(index as u32 * CELL + CELL / 2);
        draw_text_centered(
            &mut image,
            i64::from(LABEL_AREA) + offset,
            i64::from(HEADER) - 16,
            label,
            TEXT,
            1,
        );
        let row_y = i64::from(HEADER) + offset - GLYPH / 2;
        let row_x = i64::from(LABEL_AREA) - 6 - text_width(label, 1);
        draw_text(&mut image, (row_x, row_y), label, TEXT, 1);
    }

    for (row, values) in matrix.iter().enumerate() {
        for (column, value) in values.iter().enumerate() {
            let color = value.map_or(MISSING, |v| gradient.at((v + 1.0) / 2.0));
            let x0 = LABEL_AREA + column as u32 * CELL;
            let y0 = HEADER + row as u32 * CELL;
            for y in y0..(y0 + CELL).min(HEADER + side) {
                for x in x0..(x0 + CELL).min(LABEL_AREA + side) {
                    let edge = x == x0 || y == y0;
                    image.put_pixel(x, y, if edge { BACKGROUND } else { color });
                }
            }

            let (text, ink) = match value {
                Some(v) if v.abs() > 0.6 => (format!("{v:.2}"), TEXT_ON_DARK),
                Some(v) => (format!("{v:.2}"), TEXT),
                None => ("n/a".to_string(), TEXT),
            };
            let cx = i64::from(x0 + CELL / 2);
            let cy = i64::from(y0 + CELL / 2) - GLYPH / 2;
            draw_text_centered(&mut image, cx, cy, &text, ink, 1);
        }
    }

    for y in 0..side {
        let color = gradient.at(1.0 - f64::from(y) / f64::from(side.max(2) - 1));
        for x in legend_x..legend_x + LEGEND_WIDTH {
            image.put_pixel(x, HEADER + y, color);
        }
    }
    let label_x = i64::from(legend_x + LEGEND_WIDTH + 4);
    let top = i64::from(HEADER);
    let bottom = i64::from(HEADER + side);
    draw_text(&mut image, (label_x, top), "1", TEXT, 1);
    draw_text(&mut image, (label_x, (top + bottom) / 2 - GLYPH / 2), "0", TEXT, 1);
    draw_text(&mut image, (label_x, bottom - GLYPH), "-1", TEXT, 1);

    save(&image, path)
}

/// Short tick label: more decimals for small ranges, exponent for huge
/// values.
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{value:.1e}")
    } else if magnitude >= 100.0 {
        format!("{value:.0}")
    } else if magnitude >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

/// Width in pixels of `text` at `scale`.
fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH * scale
}

/// Draws `text` with its top-left corner at `origin`. Characters without a
/// glyph render as `?`.
fn draw_text(image: &mut RgbImage, origin: (i64, i64), text: &str, color: Rgb<u8>, scale: i64) {
    for (i, c) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(c)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let left = origin.0 + i as i64 * GLYPH * scale;
        for (row, bits) in glyph.iter().enumerate() {
            for column in 0..8u8 {
                if (bits >> column) & 1 == 0 {
                    continue;
                }
                let x = left + i64::from(column) * scale;
                let y = origin.1 + row as i64 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        put(image, (x + dx, y + dy), color);
                    }
                }
            }
        }
    }
}

fn draw_text_centered(
    image: &mut RgbImage,
    center_x: i64,
    top: i64,
    text: &str,
    color: Rgb<u8>,
    scale: i64,
) {
    let left = center_x - text_width(text, scale) / 2;
    draw_text(image, (left, top), text, color, scale);
}

/// Piecewise-linear gradient interpolated in linear RGB.
struct Gradient {
    stops: Vec<LinSrgb<f32>>,
}

impl Gradient {
    fn diverging() -> Self {
        let stops = [
            Lch::new(35.0f32, 60.0f32, 280.0f32),
            Lch::new(70.0f32, 30.0f32, 260.0f32),
            Lch::new(97.0f32, 0.0f32, 0.0f32),
            Lch::new(70.0f32, 40.0f32, 40.0f32),
            Lch::new(45.0f32, 75.0f32, 35.0f32),
        ];
        Self {
            stops: stops.into_iter().map(LinSrgb::from_color).collect(),
        }
    }

    /// Colour at `position` in `[0, 1]`.
    fn at(&self, position: f64) -> Rgb<u8> {
        let last = self.stops.len() - 1;
        let scaled = position.clamp(0.0, 1.0) as f32 * last as f32;
        let i = (scaled.floor() as usize).min(last);
        let j = (i + 1).min(last);
        let t = scaled - i as f32;

        let (a, b) = (self.stops[i], self.stops[j]);
        let mixed = LinSrgb::new(
            a.red + (b.red - a.red) * t,
            a.green + (b.green - a.green) * t,
            a.blue + (b.blue - a.blue) * t,
        );
        let (r, g, b) = Srgb::from_linear(mixed).into_components();
        Rgb([to_byte(r), to_byte(g), to_byte(b)])
    }
}

fn to_byte(component: f32) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn put(image: &mut RgbImage, (x, y): (i64, i64), color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < i64::from(image.width()) && y < i64::from(image.height()) {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line, optionally dashed and clipped to a plot area.
fn draw_line(
    image: &mut RgbImage,
    from: (i64, i64),
    to: (i64, i64),
    color: Rgb<u8>,
    dash: Option<u32>,
    clip: Option<&Plot>,
) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut step: u32 = 0;

    loop {
        let visible = dash.map_or(true, |d| (step / d) % 2 == 0);
        let inside = clip.map_or(true, |plot| plot.contains((x, y)));
        if visible && inside {
            put(image, (x, y), color);
        }
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

fn save(image: &RgbImage, path: &Path) -> Result<(), AnalysisError> {
    image.save(path).map_err(|source| AnalysisError::Chart {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use tempfile::TempDir;

    fn labels() -> ScatterLabels {
        ScatterLabels {
            title: "CBO_MEAN vs STARS".to_string(),
            subtitle: "Spearman: 0.800 | Pearson: 0.750".to_string(),
            x_axis: "stars (log10)".to_string(),
            y_axis: "cbo_mean".to_string(),
        }
    }

    fn inked(image: &RgbImage, rows: std::ops::Range<u32>) -> bool {
        rows.flat_map(|y| (0..image.width()).map(move |x| (x, y)))
            .any(|(x, y)| *image.get_pixel(x, y) == TEXT)
    }

    #[test]
    fn names_charts_after_the_pair() {
        assert_eq!(chart_file_name("cbo_mean", "stars"), "analise_cbo_mean_vs_stars.png");
    }

    #[test]
    fn renders_scatter_with_trend() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scatter.png");
        let points = [(1.0, 2.0), (2.0, 3.0), (3.0, 5.0), (4.0, 4.0)];

        render_scatter(&points, Some((0.8, 1.5)), &labels(), &path).unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (WIDTH, HEIGHT));
    }

    #[test]
    fn scatter_title_is_drawn_only_when_given() {
        let temp = TempDir::new().unwrap();
        let titled = temp.path().join("titled.png");
        let bare = temp.path().join("bare.png");
        let points = [(1.0, 2.0), (2.0, 3.0), (3.0, 5.0)];

        render_scatter(&points, None, &labels(), &titled).unwrap();
        render_scatter(&points, None, &ScatterLabels::default(), &bare).unwrap();

        let titled = image::open(&titled).unwrap().to_rgb8();
        let bare = image::open(&bare).unwrap().to_rgb8();
        assert!(inked(&titled, 8..24));
        assert!(!inked(&bare, 8..24));
        assert!(inked(&titled, HEIGHT - 24..HEIGHT - 16));
        assert!(!inked(&bare, HEIGHT - 24..HEIGHT - 16));
    }

    #[test]
    fn renders_single_point_without_panicking() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("one.png");

        render_scatter(&[(5.0, 5.0)], None, &ScatterLabels::default(), &path).unwrap();

        assert!(path.is_file());
    }

    #[test]
    fn renders_labelled_heatmap() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("heatmap.png");
        let matrix = vec![vec![Some(1.0), Some(-0.5)], vec![Some(-0.5), None]];
        let names = vec!["CBO".to_string(), "DIT".to_string()];

        render_heatmap(&matrix, &names, "Quality metrics correlation", &path).unwrap();

        let image = image::open(&path).unwrap().to_rgb8();
        assert_eq!(image.height(), HEADER + 2 * CELL + 10);
        assert!(inked(&image, 8..16));
        assert!(inked(&image, HEADER - 16..HEADER - 8));
    }

    #[test]
    fn text_covers_its_width() {
        let mut image = RgbImage::from_pixel(40, 16, BACKGROUND);
        draw_text(&mut image, (0, 0), "HI", TEXT, 2);

        assert_eq!(text_width("HI", 2), 32);
        assert!(inked(&image, 0..16));
        assert!((32..40).all(|x| (0..16).all(|y| *image.get_pixel(x, y) == BACKGROUND)));
    }

    #[test]
    fn tick_labels_stay_short() {
        assert_eq!(format_tick(0.5), "0.50");
        assert_eq!(format_tick(42.31), "42.3");
        assert_eq!(format_tick(1234.0), "1234");
        assert_eq!(format_tick(2_500_000.0), "2.5e6");
    }

    #[test]
    fn gradient_ends_are_blue_and_red() {
        let gradient = Gradient::diverging();
        let Rgb([r, _, b]) = gradient.at(0.0);
        assert!(b > r);
        let Rgb([r, _, b]) = gradient.at(1.0);
        assert!(r > b);
    }
}
