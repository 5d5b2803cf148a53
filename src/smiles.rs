//! Structure descriptor parsing.
//!
//! The bank describes molecules with a small, acyclic subset of SMILES:
//! organic-subset atoms, branches and explicit single/double/triple bonds.
//! Anything else (rings, bracket atoms, aromatic atoms) is rejected so that a
//! catalog typo surfaces at validation time instead of as a broken drawing.

use crate::error::RenderError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
  B,
  C,
  N,
  O,
  P,
  S,
  F,
  Cl,
  Br,
  I,
  /// Only created when hydrogens are expanded for the full structural view.
  H,
}

impl Element {
  pub fn symbol(self) -> &'static str {
    match self {
      Element::B => "B",
      Element::C => "C",
      Element::N => "N",
      Element::O => "O",
      Element::P => "P",
      Element::S => "S",
      Element::F => "F",
      Element::Cl => "Cl",
      Element::Br => "Br",
      Element::I => "I",
      Element::H => "H",
    }
  }

  /// Default valence used to derive implicit hydrogens.
  pub fn valence(self) -> u8 {
    match self {
      Element::C => 4,
      Element::B | Element::N | Element::P => 3,
      Element::O | Element::S => 2,
      Element::F | Element::Cl | Element::Br | Element::I | Element::H => 1,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atom {
  pub element: Element,
  pub implicit_h: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bond {
  pub from: usize,
  pub to: usize,
  pub order: u8,
}

/// Atom/bond graph of one molecule. Atom indices follow descriptor order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Molecule {
  pub atoms: Vec<Atom>,
  pub bonds: Vec<Bond>,
}

impl Molecule {
  /// Bonds touching `atom`, paired with the atom on the other end.
  pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = (usize, &Bond)> + '_ {
    self.bonds.iter().filter_map(move |b| {
      if b.from == atom {
        Some((b.to, b))
      } else if b.to == atom {
        Some((b.from, b))
      } else {
        None
      }
    })
  }

  fn bond_order_sum(&self, atom: usize) -> u32 {
    self.neighbors(atom).map(|(_, b)| u32::from(b.order)).sum()
  }

  /// Hill-order molecular formula with hydrogens, e.g. "C2H6O". Without
  /// carbon every symbol, hydrogen included, is alphabetical ("H2O").
  pub fn formula(&self) -> String {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    let mut tally = |sym: &'static str, n: usize| {
      if n == 0 {
        return;
      }
      match counts.iter_mut().find(|(s, _)| *s == sym) {
        Some((_, total)) => *total += n,
        None => counts.push((sym, n)),
      }
    };
    for atom in &self.atoms {
      tally(atom.element.symbol(), 1);
      tally(Element::H.symbol(), atom.implicit_h as usize);
    }
    let has_carbon = counts.iter().any(|(s, _)| *s == "C");
    counts.sort_by(|a, b| {
      let rank = |s: &str| match s {
        "C" if has_carbon => 0,
        "H" if has_carbon => 1,
        _ => 2,
      };
      rank(a.0).cmp(&rank(b.0)).then(a.0.cmp(b.0))
    });

    let mut out = String::new();
    for (sym, n) in counts {
      out.push_str(sym);
      if n > 1 {
        out.push_str(&n.to_string());
      }
    }
    out
  }
}

/// Parse a descriptor into a molecule and fill in implicit hydrogens.
pub fn parse(descriptor: &str) -> Result<Molecule, RenderError> {
  let src = descriptor.trim();
  if src.is_empty() {
    return Err(RenderError::Empty);
  }

  let chars: Vec<char> = src.chars().collect();
  let mut mol = Molecule::default();
  let mut prev: Option<usize> = None;
  let mut branches: Vec<Option<usize>> = Vec::new();
  let mut pending_order: Option<(u8, usize)> = None;
  let mut i = 0usize;

  while i < chars.len() {
    let ch = chars[i];
    match ch {
      '(' => {
        if prev.is_none() {
          return Err(syntax(i, "branch opened before any atom"));
        }
        if pending_order.is_some() {
          return Err(syntax(i, "bond symbol before branch"));
        }
        branches.push(prev);
        i += 1;
      }
      ')' => {
        if pending_order.is_some() {
          return Err(syntax(i, "dangling bond at end of branch"));
        }
        match branches.pop() {
          Some(anchor) => prev = anchor,
          None => return Err(syntax(i, "unbalanced ')'")),
        }
        if chars.get(i.wrapping_sub(1)) == Some(&'(') {
          return Err(syntax(i, "empty branch"));
        }
        i += 1;
      }
      '-' | '=' | '#' => {
        if prev.is_none() {
          return Err(syntax(i, "bond before any atom"));
        }
        if pending_order.is_some() {
          return Err(syntax(i, "two bond symbols in a row"));
        }
        let order = match ch {
          '-' => 1,
          '=' => 2,
          _ => 3,
        };
        pending_order = Some((order, i));
        i += 1;
      }
      '0'..='9' | '%' => return Err(unsupported(i, "ring closure")),
      '[' => return Err(unsupported(i, "bracket atom")),
      '.' => return Err(unsupported(i, "disconnected fragments")),
      '/' | '\\' => return Err(unsupported(i, "double-bond stereo marker")),
      'b' | 'c' | 'n' | 'o' | 'p' | 's' => return Err(unsupported(i, "aromatic atom")),
      _ => {
        let (element, width) = read_element(&chars, i)?;
        let idx = mol.atoms.len();
        mol.atoms.push(Atom { element, implicit_h: 0 });
        if let Some(p) = prev {
          let order = pending_order.take().map(|(o, _)| o).unwrap_or(1);
          mol.bonds.push(Bond { from: p, to: idx, order });
        }
        prev = Some(idx);
        i += width;
      }
    }
  }

  if let Some((_, pos)) = pending_order {
    return Err(syntax(pos, "bond symbol without a following atom"));
  }
  if !branches.is_empty() {
    return Err(syntax(chars.len(), "unclosed '('"));
  }

  for idx in 0..mol.atoms.len() {
    let used = mol.bond_order_sum(idx);
    let element = mol.atoms[idx].element;
    let max = element.valence();
    let free = u32::from(max)
      .checked_sub(used)
      .ok_or(RenderError::Valence { atom: idx, element: element.symbol(), max })?;
    // free <= max, which fits in u8
    mol.atoms[idx].implicit_h = free as u8;
  }

  Ok(mol)
}

fn read_element(chars: &[char], i: usize) -> Result<(Element, usize), RenderError> {
  let next = chars.get(i + 1).copied();
  let el = match (chars[i], next) {
    ('C', Some('l')) => return Ok((Element::Cl, 2)),
    ('B', Some('r')) => return Ok((Element::Br, 2)),
    ('B', _) => Element::B,
    ('C', _) => Element::C,
    ('N', _) => Element::N,
    ('O', _) => Element::O,
    ('P', _) => Element::P,
    ('S', _) => Element::S,
    ('F', _) => Element::F,
    ('I', _) => Element::I,
    (other, _) => return Err(syntax(i, &format!("unexpected character '{}'", other))),
  };
  Ok((el, 1))
}

fn syntax(pos: usize, message: &str) -> RenderError {
  RenderError::Syntax { pos, message: message.to_string() }
}

fn unsupported(pos: usize, feature: &str) -> RenderError {
  RenderError::Unsupported { pos, feature: feature.to_string() }
}
