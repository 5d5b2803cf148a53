//! Renderer adapter: turns a compound's structure descriptor into the view the
//! student picked.
//!
//! Skeletal and full structural views are SVG drawings built from a simple 2D
//! tree layout (zig-zag chains, 120° bond angles). The condensed view is the
//! catalog's condensed formula with subscripts applied.
//!
//! Renderings are memoized per (compound id, view); the bank is immutable so
//! entries never go stale.

use std::{
  collections::HashMap,
  f64::consts::PI,
  fmt::Write as _,
  sync::RwLock,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, instrument};

use crate::domain::{Compound, ViewKind};
use crate::error::RenderError;
use crate::smiles::{self, Element, Molecule};

const SKELETAL_SIZE: (f64, f64) = (350.0, 250.0);
const FULL_SIZE: (f64, f64) = (550.0, 450.0);
const H_BOND_SCALE: f64 = 0.65;

/// Output of one rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rendering {
  Svg(String),
  Text(String),
}

impl Rendering {
  pub fn content_type(&self) -> &'static str {
    match self {
      Rendering::Svg(_) => "image/svg+xml",
      Rendering::Text(_) => "text/plain; charset=utf-8",
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Rendering::Svg(s) | Rendering::Text(s) => s,
    }
  }

  /// `data:` URI suitable for an `<img src>`; only meaningful for SVG.
  pub fn data_uri(&self) -> Option<String> {
    match self {
      Rendering::Svg(s) => Some(format!("data:image/svg+xml;base64,{}", STANDARD.encode(s))),
      Rendering::Text(_) => None,
    }
  }
}

#[derive(Default)]
pub struct Renderer {
  cache: RwLock<HashMap<(String, ViewKind), Rendering>>,
}

impl Renderer {
  pub fn new() -> Self {
    Self::default()
  }

  #[instrument(level = "debug", skip(self, compound), fields(id = %compound.id, ?view))]
  pub fn render(&self, compound: &Compound, view: ViewKind) -> Result<Rendering, RenderError> {
    let key = (compound.id.clone(), view);
    if let Some(hit) = self.cache.read().ok().and_then(|c| c.get(&key).cloned()) {
      return Ok(hit);
    }

    let out = render_uncached(compound, view)?;
    debug!(target: "quiz", id = %compound.id, ?view, bytes = out.as_str().len(), "Rendered structure");
    if let Ok(mut cache) = self.cache.write() {
      cache.insert(key, out.clone());
    }
    Ok(out)
  }
}

fn render_uncached(compound: &Compound, view: ViewKind) -> Result<Rendering, RenderError> {
  match view {
    ViewKind::Skeletal => {
      let mol = smiles::parse(&compound.smiles)?;
      Ok(Rendering::Svg(draw_skeletal(&mol)))
    }
    ViewKind::Full => {
      let mol = smiles::parse(&compound.smiles)?;
      Ok(Rendering::Svg(draw_full(&mol)))
    }
    ViewKind::Condensed => {
      let raw = compound
        .condensed
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| RenderError::MissingCondensed(compound.id.clone()))?;
      Ok(Rendering::Text(format_condensed(raw)))
    }
  }
}

/// `CH3(CH2)3CH3` -> `CH₃(CH₂)₃CH₃`, `#` -> `≡`.
/// Only digits that follow an element letter or `)` are counts.
pub fn format_condensed(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len() * 2);
  let mut count_context = false;
  for ch in raw.trim().chars() {
    if ch.is_ascii_digit() && count_context {
      out.push(subscript(ch));
      continue;
    }
    count_context = ch.is_ascii_alphabetic() || ch == ')';
    out.push(if ch == '#' { '≡' } else { ch });
  }
  out
}

fn subscript(d: char) -> char {
  match d {
    '0' => '₀',
    '1' => '₁',
    '2' => '₂',
    '3' => '₃',
    '4' => '₄',
    '5' => '₅',
    '6' => '₆',
    '7' => '₇',
    '8' => '₈',
    '9' => '₉',
    other => other,
  }
}

fn subscript_count(n: u8) -> String {
  if n <= 1 {
    String::new()
  } else {
    n.to_string().chars().map(subscript).collect()
  }
}

// ---------- Layout ----------

#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
  x: f64,
  y: f64,
}

fn unit(deg: f64) -> (f64, f64) {
  let r = deg * PI / 180.0;
  (r.cos(), r.sin())
}

/// Place heavy atoms in model space (bond length 1, y up).
fn layout(mol: &Molecule) -> Vec<Point> {
  let n = mol.atoms.len();
  let mut pos = vec![Point { x: 0.0, y: 0.0 }; n];
  if n == 0 {
    return pos;
  }

  // (atom, parent, incoming angle, turn sign)
  let mut stack: Vec<(usize, Option<usize>, f64, f64)> = vec![(0, None, 0.0, 1.0)];
  while let Some((atom, parent, incoming, sign)) = stack.pop() {
    let children: Vec<usize> = mol
      .neighbors(atom)
      .map(|(other, _)| other)
      .filter(|other| Some(*other) != parent)
      .collect();

    // The last neighbour in descriptor order is the main chain, earlier ones are branches.
    let placements: Vec<(f64, f64)> = match (parent, children.len()) {
      (_, 0) => vec![],
      (None, 1) => vec![(-30.0, 1.0)],
      (None, 2) => vec![(210.0, -1.0), (-30.0, 1.0)],
      (None, 3) => vec![(90.0, -1.0), (210.0, -1.0), (-30.0, 1.0)],
      (None, _) => vec![(90.0, -1.0), (180.0, -1.0), (270.0, 1.0), (0.0, 1.0)],
      (Some(_), 1) => vec![(incoming + sign * 60.0, -sign)],
      (Some(_), 2) => vec![(incoming - sign * 60.0, sign), (incoming + sign * 60.0, -sign)],
      (Some(_), _) => vec![(incoming + 90.0, sign), (incoming - 90.0, -sign), (incoming, sign)],
    };

    for (child, (angle, child_sign)) in children.into_iter().zip(placements) {
      let (dx, dy) = unit(angle);
      pos[child] = Point { x: pos[atom].x + dx, y: pos[atom].y + dy };
      stack.push((child, Some(atom), angle, child_sign));
    }
  }
  pos
}

/// Angles (degrees) at which to hang `count` hydrogens on an atom whose
/// existing bonds point along `bond_angles`. They share the widest free gap.
fn hydrogen_angles(bond_angles: &[f64], count: u8) -> Vec<f64> {
  if count == 0 {
    return vec![];
  }
  let n = count as f64;
  if bond_angles.is_empty() {
    return (0..count).map(|j| j as f64 * 360.0 / n).collect();
  }

  let mut sorted: Vec<f64> = bond_angles.iter().map(|a| a.rem_euclid(360.0)).collect();
  sorted.sort_by(|a, b| a.total_cmp(b));

  let mut best = (sorted[0], 0.0);
  for w in 0..sorted.len() {
    let start = sorted[w];
    let end = if w + 1 < sorted.len() { sorted[w + 1] } else { sorted[0] + 360.0 };
    if end - start > best.1 {
      best = (start, end - start);
    }
  }
  let (start, gap) = best;
  (1..=count).map(|j| start + gap * j as f64 / (n + 1.0)).collect()
}

fn angle_between(a: Point, b: Point) -> f64 {
  (b.y - a.y).atan2(b.x - a.x) * 180.0 / PI
}

// ---------- Drawing ----------

struct Label {
  symbol: &'static str,
  hydrogens: u8,
  /// Write hydrogens before the symbol ("HO-") when bonds leave to the right.
  h_first: bool,
  color: &'static str,
}

struct Scene {
  points: Vec<Point>,
  /// (from, to, order)
  lines: Vec<(usize, usize, u8)>,
  labels: Vec<Option<Label>>,
}

fn color_of(el: Element) -> &'static str {
  match el {
    Element::C | Element::H => "#222222",
    Element::O => "#e00000",
    Element::N => "#3050f8",
    Element::F | Element::Cl => "#1f9f1f",
    Element::Br => "#a62929",
    Element::I => "#940094",
    Element::S => "#c09000",
    Element::P => "#ff8000",
    Element::B => "#c06060",
  }
}

fn h_first(mol: &Molecule, pos: &[Point], atom: usize) -> bool {
  let (mut dx, mut k) = (0.0, 0);
  for (other, _) in mol.neighbors(atom) {
    dx += pos[other].x - pos[atom].x;
    k += 1;
  }
  k > 0 && dx > 1e-6
}

fn draw_skeletal(mol: &Molecule) -> String {
  let pos = layout(mol);
  let labels = mol
    .atoms
    .iter()
    .enumerate()
    .map(|(i, a)| {
      let lone = mol.neighbors(i).next().is_none();
      (a.element != Element::C || lone).then(|| Label {
        symbol: a.element.symbol(),
        hydrogens: a.implicit_h,
        h_first: h_first(mol, &pos, i),
        color: color_of(a.element),
      })
    })
    .collect();
  let lines = mol.bonds.iter().map(|b| (b.from, b.to, b.order)).collect();
  svg(&Scene { points: pos, lines, labels }, SKELETAL_SIZE, 18.0, 60.0)
}

fn draw_full(mol: &Molecule) -> String {
  let mut points = layout(mol);
  let mut lines: Vec<(usize, usize, u8)> = mol.bonds.iter().map(|b| (b.from, b.to, b.order)).collect();
  let mut labels: Vec<Option<Label>> = mol
    .atoms
    .iter()
    .map(|a| {
      Some(Label { symbol: a.element.symbol(), hydrogens: 0, h_first: false, color: color_of(a.element) })
    })
    .collect();

  for (i, atom) in mol.atoms.iter().enumerate() {
    let here = points[i];
    let bond_angles: Vec<f64> = mol.neighbors(i).map(|(o, _)| angle_between(here, points[o])).collect();
    for angle in hydrogen_angles(&bond_angles, atom.implicit_h) {
      let (dx, dy) = unit(angle);
      let h = points.len();
      points.push(Point { x: here.x + dx * H_BOND_SCALE, y: here.y + dy * H_BOND_SCALE });
      lines.push((i, h, 1));
      labels.push(Some(Label { symbol: "H", hydrogens: 0, h_first: false, color: color_of(Element::H) }));
    }
  }

  svg(&Scene { points, lines, labels }, FULL_SIZE, 15.0, 70.0)
}

fn svg(scene: &Scene, (width, height): (f64, f64), font: f64, max_bond_px: f64) -> String {
  let pad = font * 1.8;
  let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
  for p in &scene.points {
    min_x = min_x.min(p.x);
    max_x = max_x.max(p.x);
    min_y = min_y.min(p.y);
    max_y = max_y.max(p.y);
  }
  let span_x = (max_x - min_x).max(1e-6);
  let span_y = (max_y - min_y).max(1e-6);
  let scale = ((width - 2.0 * pad) / span_x).min((height - 2.0 * pad) / span_y).min(max_bond_px);
  let cx = (min_x + max_x) / 2.0;
  let cy = (min_y + max_y) / 2.0;
  let to_px = |p: Point| Point {
    x: width / 2.0 + (p.x - cx) * scale,
    y: height / 2.0 - (p.y - cy) * scale,
  };
  let px: Vec<Point> = scene.points.iter().copied().map(to_px).collect();

  let mut out = String::new();
  let _ = write!(
    out,
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
    w = width,
    h = height
  );
  out.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
  out.push_str(r##"<g stroke="#222222" stroke-width="2" stroke-linecap="round">"##);

  let trim = font * 0.6;
  let gap = (scale * 0.12).max(3.0);
  for &(a, b, order) in &scene.lines {
    let (p, q) = (px[a], px[b]);
    let len = ((q.x - p.x).powi(2) + (q.y - p.y).powi(2)).sqrt().max(1e-6);
    let (ux, uy) = ((q.x - p.x) / len, (q.y - p.y) / len);
    let (nx, ny) = (-uy, ux);
    let ta = if scene.labels[a].is_some() { trim } else { 0.0 };
    let tb = if scene.labels[b].is_some() { trim } else { 0.0 };
    let start = Point { x: p.x + ux * ta, y: p.y + uy * ta };
    let end = Point { x: q.x - ux * tb, y: q.y - uy * tb };

    let offsets: &[f64] = match order {
      2 => &[-0.5, 0.5],
      3 => &[-1.0, 0.0, 1.0],
      _ => &[0.0],
    };
    for k in offsets {
      let (ox, oy) = (nx * gap * k, ny * gap * k);
      let _ = write!(
        out,
        r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
        start.x + ox,
        start.y + oy,
        end.x + ox,
        end.y + oy
      );
    }
  }
  out.push_str("</g>");

  let _ = write!(
    out,
    r#"<g font-family="Arial, sans-serif" font-size="{font}" font-weight="bold" dominant-baseline="central">"#
  );
  let sym_w = font * 0.62;
  for (i, label) in scene.labels.iter().enumerate() {
    let Some(label) = label else { continue };
    let p = px[i];
    let hs = if label.hydrogens > 0 { format!("H{}", subscript_count(label.hydrogens)) } else { String::new() };
    let half = sym_w * label.symbol.len() as f64 / 2.0;
    let (x, anchor, text) = if label.h_first {
      (p.x + half, "end", format!("{}{}", hs, label.symbol))
    } else {
      (p.x - half, "start", format!("{}{}", label.symbol, hs))
    };
    let _ = write!(
      out,
      r#"<text x="{:.1}" y="{:.1}" text-anchor="{}" fill="{}">{}</text>"#,
      x, p.y, anchor, label.color, text
    );
  }
  out.push_str("</g></svg>");
  out
}
