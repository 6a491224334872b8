use super::pattern::{
    AtomExpr, AtomPrimitive, BondExpr, BondPrimitive, PatternBond, SmartsPattern,
};
use crate::core::models::element;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmartsError {
    #[error("SMARTS pattern is empty")]
    Empty,

    #[error("Unexpected character '{ch}' at position {position} in SMARTS")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("Unexpected end of SMARTS pattern")]
    UnexpectedEnd,

    #[error("Unknown element '{symbol}' at position {position} in SMARTS")]
    UnknownElement { symbol: String, position: usize },

    #[error("Unbalanced parenthesis at position {position} in SMARTS")]
    UnbalancedParenthesis { position: usize },

    #[error("Ring closure {label} in SMARTS was opened but never closed")]
    UnclosedRing { label: u16 },
}

pub(super) fn parse_pattern(smarts: &str) -> Result<SmartsPattern, SmartsError> {
    if smarts.is_empty() {
        return Err(SmartsError::Empty);
    }
    let mut reader = SmartsReader::new(smarts);
    reader.read()?;
    if reader.atoms.is_empty() {
        return Err(SmartsError::Empty);
    }
    Ok(SmartsPattern::new(smarts.to_string(), reader.atoms, reader.bonds))
}

struct SmartsReader<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<AtomExpr>,
    bonds: Vec<PatternBond>,
    branches: Vec<(usize, usize)>,
    open_rings: BTreeMap<u16, (usize, Option<BondExpr>)>,
    previous: Option<usize>,
    pending: Option<BondExpr>,
}

impl<'a> SmartsReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            branches: Vec::new(),
            open_rings: BTreeMap::new(),
            previous: None,
            pending: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmartsError {
        match self.peek() {
            Some(ch) => SmartsError::UnexpectedCharacter {
                ch: ch as char,
                position: self.pos,
            },
            None => SmartsError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, ch: u8) -> Result<(), SmartsError> {
        if self.peek() == Some(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add((d - b'0') as u32);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn read_small(&mut self) -> Option<u8> {
        self.read_number().map(|n| n.min(u8::MAX as u32) as u8)
    }

    fn read(&mut self) -> Result<(), SmartsError> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    let anchor = self.previous.ok_or_else(|| self.unexpected())?;
                    self.branches.push((anchor, self.pos));
                    self.pos += 1;
                }
                b')' => {
                    let (anchor, _) = self
                        .branches
                        .pop()
                        .ok_or(SmartsError::UnbalancedParenthesis { position: self.pos })?;
                    if self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    self.previous = Some(anchor);
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b':' | b'~' | b'@' | b'/' | b'\\' | b'!' => {
                    if self.previous.is_none() || self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    let expr = self.bond_expression()?;
                    self.pending = Some(expr);
                }
                b'.' => {
                    self.previous = None;
                    self.pending = None;
                    self.pos += 1;
                }
                b'%' => {
                    self.pos += 1;
                    let tens = self.peek().filter(u8::is_ascii_digit);
                    let units = self.peek_at(1).filter(u8::is_ascii_digit);
                    let (Some(t), Some(u)) = (tens, units) else {
                        return Err(self.unexpected());
                    };
                    self.pos += 2;
                    self.ring_closure((t - b'0') as u16 * 10 + (u - b'0') as u16)?;
                }
                b'0'..=b'9' => {
                    self.pos += 1;
                    self.ring_closure((ch - b'0') as u16)?;
                }
                b'[' => {
                    self.pos += 1;
                    let expr = self.bracket_atom()?;
                    self.push_atom(expr);
                }
                _ => {
                    let expr = self.bare_atom()?;
                    self.push_atom(expr);
                }
            }
        }

        if let Some(&(_, position)) = self.branches.last() {
            return Err(SmartsError::UnbalancedParenthesis { position });
        }
        if let Some((&label, _)) = self.open_rings.iter().next() {
            return Err(SmartsError::UnclosedRing { label });
        }
        if self.pending.is_some() {
            return Err(SmartsError::UnexpectedEnd);
        }
        Ok(())
    }

    fn push_atom(&mut self, expr: AtomExpr) {
        let idx = self.atoms.len();
        self.atoms.push(expr);
        if let Some(prev) = self.previous {
            let bond = self.pending.take().unwrap_or(BondExpr::Implicit);
            self.bonds.push(PatternBond {
                begin: prev,
                end: idx,
                expr: bond,
            });
        }
        self.previous = Some(idx);
    }

    fn ring_closure(&mut self, label: u16) -> Result<(), SmartsError> {
        let current = self.previous.ok_or_else(|| self.unexpected())?;
        let explicit = self.pending.take();
        match self.open_rings.remove(&label) {
            Some((open, open_expr)) => {
                let expr = explicit.or(open_expr).unwrap_or(BondExpr::Implicit);
                self.bonds.push(PatternBond {
                    begin: open,
                    end: current,
                    expr,
                });
            }
            None => {
                self.open_rings.insert(label, (current, explicit));
            }
        }
        Ok(())
    }

    fn bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let ch = self.peek().ok_or(SmartsError::UnexpectedEnd)?;
        let (primitive, width) = match ch {
            b'*' => (AtomPrimitive::Any, 1),
            b'a' => (AtomPrimitive::Aromatic, 1),
            b'A' => (AtomPrimitive::Aliphatic, 1),
            b'B' if self.peek_at(1) == Some(b'r') => (AtomPrimitive::AliphaticElement(35), 2),
            b'C' if self.peek_at(1) == Some(b'l') => (AtomPrimitive::AliphaticElement(17), 2),
            b'B' => (AtomPrimitive::AliphaticElement(5), 1),
            b'C' => (AtomPrimitive::AliphaticElement(6), 1),
            b'N' => (AtomPrimitive::AliphaticElement(7), 1),
            b'O' => (AtomPrimitive::AliphaticElement(8), 1),
            b'P' => (AtomPrimitive::AliphaticElement(15), 1),
            b'S' => (AtomPrimitive::AliphaticElement(16), 1),
            b'F' => (AtomPrimitive::AliphaticElement(9), 1),
            b'I' => (AtomPrimitive::AliphaticElement(53), 1),
            b'b' => (AtomPrimitive::AromaticElement(5), 1),
            b'c' => (AtomPrimitive::AromaticElement(6), 1),
            b'n' => (AtomPrimitive::AromaticElement(7), 1),
            b'o' => (AtomPrimitive::AromaticElement(8), 1),
            b'p' => (AtomPrimitive::AromaticElement(15), 1),
            b's' => (AtomPrimitive::AromaticElement(16), 1),
            _ => return Err(self.unexpected()),
        };
        self.pos += width;
        Ok(AtomExpr::Primitive(primitive))
    }

    fn bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let isotope = self.read_number();
        let hydrogen_atom = self.peek() == Some(b'H')
            && matches!(self.peek_at(1), Some(b']' | b'+' | b'-' | b':'));

        let mut expr = if hydrogen_atom || (isotope.is_some() && self.peek() == Some(b'H')) {
            self.pos += 1;
            let atom = AtomExpr::Primitive(AtomPrimitive::AliphaticElement(1));
            if matches!(self.peek(), Some(b'+' | b'-')) {
                let charge = self.charge()?;
                AtomExpr::And(vec![atom, charge])
            } else {
                atom
            }
        } else {
            self.low_and()?
        };

        if let Some(mass) = isotope {
            let mass = u16::try_from(mass).unwrap_or(u16::MAX);
            expr = AtomExpr::And(vec![AtomExpr::Primitive(AtomPrimitive::Isotope(mass)), expr]);
        }

        if self.peek() == Some(b':') {
            self.pos += 1;
            self.read_number().ok_or_else(|| self.unexpected())?;
        }
        self.expect(b']')?;
        Ok(expr)
    }

    fn low_and(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut terms = vec![self.or()?];
        while self.peek() == Some(b';') {
            self.pos += 1;
            terms.push(self.or()?);
        }
        Ok(collapse(terms, AtomExpr::And))
    }

    fn or(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut terms = vec![self.high_and()?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            terms.push(self.high_and()?);
        }
        Ok(collapse(terms, AtomExpr::Or))
    }

    fn high_and(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut terms = vec![self.not()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    terms.push(self.not()?);
                }
                Some(b']' | b',' | b';' | b':') | None => break,
                Some(_) => terms.push(self.not()?),
            }
        }
        Ok(collapse(terms, AtomExpr::And))
    }

    fn not(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.pos += 1;
            let inner = self.not()?;
            return Ok(AtomExpr::Not(Box::new(inner)));
        }
        self.primitive()
    }

    fn primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let position = self.pos;
        let ch = self.peek().ok_or(SmartsError::UnexpectedEnd)?;
        let primitive = match ch {
            b'$' => {
                self.pos += 1;
                return self.recursive();
            }
            b'#' => {
                self.pos += 1;
                let z = self.read_small().ok_or_else(|| self.unexpected())?;
                AtomPrimitive::AtomicNumber(z)
            }
            b'*' => {
                self.pos += 1;
                AtomPrimitive::Any
            }
            b'+' | b'-' => return self.charge(),
            b'@' => {
                while matches!(self.peek(), Some(b'@' | b'?')) {
                    self.pos += 1;
                }
                AtomPrimitive::Any
            }
            b'0'..=b'9' => {
                let mass = self.read_number().unwrap_or(0);
                AtomPrimitive::Isotope(u16::try_from(mass).unwrap_or(u16::MAX))
            }
            b'A'..=b'Z' => {
                if let Some(z) = self.two_letter_element() {
                    AtomPrimitive::AliphaticElement(z)
                } else {
                    self.pos += 1;
                    match ch {
                        b'A' => AtomPrimitive::Aliphatic,
                        b'D' => AtomPrimitive::Degree(self.read_small().unwrap_or(1)),
                        b'H' => AtomPrimitive::TotalHydrogens(self.read_small().unwrap_or(1)),
                        b'X' => AtomPrimitive::Connectivity(self.read_small().unwrap_or(1)),
                        b'R' => AtomPrimitive::RingMembership(self.read_small()),
                        _ => {
                            let symbol = (ch as char).to_string();
                            let e = element::by_symbol(&symbol)
                                .ok_or(SmartsError::UnknownElement { symbol, position })?;
                            AtomPrimitive::AliphaticElement(e.atomic_number)
                        }
                    }
                }
            }
            b'a'..=b'z' => {
                if let Some(second) = self.peek_at(1) {
                    let pair = [ch, second];
                    let symbol = std::str::from_utf8(&pair).unwrap_or_default();
                    if let Some(z) = element::aromatic_symbol(symbol) {
                        self.pos += 2;
                        return Ok(AtomExpr::Primitive(AtomPrimitive::AromaticElement(z)));
                    }
                }
                self.pos += 1;
                match ch {
                    b'a' => AtomPrimitive::Aromatic,
                    b'h' => AtomPrimitive::ImplicitHydrogens(self.read_small().unwrap_or(1)),
                    b'v' => AtomPrimitive::Valence(self.read_small().unwrap_or(1)),
                    b'r' => AtomPrimitive::RingSize(self.read_small()),
                    b'x' => AtomPrimitive::RingConnectivity(self.read_small()),
                    _ => {
                        let one = [ch];
                        let symbol = std::str::from_utf8(&one).unwrap_or_default();
                        let z = element::aromatic_symbol(symbol).ok_or_else(|| {
                            SmartsError::UnknownElement {
                                symbol: symbol.to_string(),
                                position,
                            }
                        })?;
                        AtomPrimitive::AromaticElement(z)
                    }
                }
            }
            _ => return Err(self.unexpected()),
        };
        Ok(AtomExpr::Primitive(primitive))
    }

    fn two_letter_element(&mut self) -> Option<u8> {
        let first = self.peek()?;
        let second = self.peek_at(1).filter(u8::is_ascii_lowercase)?;
        let pair = [first, second];
        let symbol = std::str::from_utf8(&pair).ok()?;
        let e = element::by_symbol(symbol)?;
        self.pos += 2;
        Some(e.atomic_number)
    }

    fn charge(&mut self) -> Result<AtomExpr, SmartsError> {
        let sign = self.peek().ok_or(SmartsError::UnexpectedEnd)?;
        let unit: i16 = if sign == b'+' { 1 } else { -1 };
        self.pos += 1;
        let magnitude = match self.read_number() {
            Some(n) => n.min(i8::MAX as u32) as i16,
            None => {
                let mut count = 1;
                while self.peek() == Some(sign) {
                    self.pos += 1;
                    count += 1;
                }
                count
            }
        };
        let charge = (unit * magnitude).clamp(i8::MIN as i16, i8::MAX as i16) as i8;
        Ok(AtomExpr::Primitive(AtomPrimitive::Charge(charge)))
    }

    fn recursive(&mut self) -> Result<AtomExpr, SmartsError> {
        self.expect(b'(')?;
        let start = self.pos;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some(b'(') => depth += 1,
                Some(b')') => depth -= 1,
                Some(_) => {}
                None => return Err(SmartsError::UnbalancedParenthesis { position: start - 1 }),
            }
            self.pos += 1;
        }
        let inner = std::str::from_utf8(&self.input[start..self.pos - 1])
            .map_err(|_| SmartsError::UnexpectedEnd)?;
        let pattern = parse_pattern(inner).map_err(|e| offset_error(e, start))?;
        Ok(AtomExpr::Primitive(AtomPrimitive::Recursive(Box::new(pattern))))
    }

    fn bond_expression(&mut self) -> Result<BondExpr, SmartsError> {
        let mut terms = vec![self.bond_or()?];
        while self.peek() == Some(b';') {
            self.pos += 1;
            terms.push(self.bond_or()?);
        }
        Ok(collapse(terms, BondExpr::And))
    }

    fn bond_or(&mut self) -> Result<BondExpr, SmartsError> {
        let mut terms = vec![self.bond_and()?];
        while self.peek() == Some(b',') {
            self.pos += 1;
            terms.push(self.bond_and()?);
        }
        Ok(collapse(terms, BondExpr::Or))
    }

    fn bond_and(&mut self) -> Result<BondExpr, SmartsError> {
        let mut terms = vec![self.bond_not()?];
        loop {
            match self.peek() {
                Some(b'&') => {
                    self.pos += 1;
                    terms.push(self.bond_not()?);
                }
                Some(b'-' | b'=' | b'#' | b':' | b'~' | b'@' | b'/' | b'\\' | b'!') => {
                    terms.push(self.bond_not()?);
                }
                _ => break,
            }
        }
        Ok(collapse(terms, BondExpr::And))
    }

    fn bond_not(&mut self) -> Result<BondExpr, SmartsError> {
        if self.peek() == Some(b'!') {
            self.pos += 1;
            let inner = self.bond_not()?;
            return Ok(BondExpr::Not(Box::new(inner)));
        }
        let primitive = match self.peek() {
            Some(b'-' | b'/' | b'\\') => BondPrimitive::Single,
            Some(b'=') => BondPrimitive::Double,
            Some(b'#') => BondPrimitive::Triple,
            Some(b':') => BondPrimitive::Aromatic,
            Some(b'~') => BondPrimitive::Any,
            Some(b'@') => BondPrimitive::Ring,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(BondExpr::Primitive(primitive))
    }
}

fn collapse<T>(mut terms: Vec<T>, combine: fn(Vec<T>) -> T) -> T {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        combine(terms)
    }
}

fn offset_error(error: SmartsError, offset: usize) -> SmartsError {
    match error {
        SmartsError::UnexpectedCharacter { ch, position } => SmartsError::UnexpectedCharacter {
            ch,
            position: position + offset,
        },
        SmartsError::UnknownElement { symbol, position } => SmartsError::UnknownElement {
            symbol,
            position: position + offset,
        },
        SmartsError::UnbalancedParenthesis { position } => SmartsError::UnbalancedParenthesis {
            position: position + offset,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_atom(smarts: &str) -> AtomExpr {
        parse_pattern(smarts).unwrap().atoms()[0].clone()
    }

    #[test]
    fn bare_atoms_distinguish_aromaticity() {
        assert_eq!(
            first_atom("C"),
            AtomExpr::Primitive(AtomPrimitive::AliphaticElement(6))
        );
        assert_eq!(
            first_atom("c"),
            AtomExpr::Primitive(AtomPrimitive::AromaticElement(6))
        );
        assert_eq!(
            first_atom("Cl"),
            AtomExpr::Primitive(AtomPrimitive::AliphaticElement(17))
        );
    }

    #[test]
    fn bracket_operators_follow_precedence() {
        // `,` binds tighter than `;`
        let expr = first_atom("[O,S;H1]");
        let AtomExpr::And(terms) = expr else {
            panic!("expected low-precedence and");
        };
        assert_eq!(terms.len(), 2);
        assert!(matches!(terms[0], AtomExpr::Or(_)));
        assert_eq!(
            terms[1],
            AtomExpr::Primitive(AtomPrimitive::TotalHydrogens(1))
        );

        // implicit and binds tighter than `,`
        let expr = first_atom("[CH3,NH2]");
        let AtomExpr::Or(terms) = expr else {
            panic!("expected or");
        };
        assert!(terms.iter().all(|t| matches!(t, AtomExpr::And(_))));
    }

    #[test]
    fn element_symbols_are_preferred_over_primitives() {
        assert_eq!(
            first_atom("[Br]"),
            AtomExpr::Primitive(AtomPrimitive::AliphaticElement(35))
        );
        assert_eq!(
            first_atom("[Hg]"),
            AtomExpr::Primitive(AtomPrimitive::AliphaticElement(80))
        );
        assert_eq!(
            first_atom("[H]"),
            AtomExpr::Primitive(AtomPrimitive::AliphaticElement(1))
        );
        assert_eq!(
            first_atom("[se]"),
            AtomExpr::Primitive(AtomPrimitive::AromaticElement(34))
        );
    }

    #[test]
    fn charges_and_counts_parse() {
        assert_eq!(
            first_atom("[+0]"),
            AtomExpr::Primitive(AtomPrimitive::Charge(0))
        );
        assert_eq!(
            first_atom("[--]"),
            AtomExpr::Primitive(AtomPrimitive::Charge(-2))
        );
        assert_eq!(
            first_atom("[R]"),
            AtomExpr::Primitive(AtomPrimitive::RingMembership(None))
        );
        assert_eq!(
            first_atom("[r5]"),
            AtomExpr::Primitive(AtomPrimitive::RingSize(Some(5)))
        );
        assert_eq!(
            first_atom("[v4]"),
            AtomExpr::Primitive(AtomPrimitive::Valence(4))
        );
    }

    #[test]
    fn recursive_patterns_nest() {
        let expr = first_atom("[!$(*#*)&!D1]");
        let AtomExpr::And(terms) = expr else {
            panic!("expected and");
        };
        let AtomExpr::Not(inner) = &terms[0] else {
            panic!("expected negation");
        };
        assert!(matches!(
            **inner,
            AtomExpr::Primitive(AtomPrimitive::Recursive(_))
        ));
    }

    #[test]
    fn bonds_and_rings_are_recorded() {
        let pattern = parse_pattern("C=!@C").unwrap();
        assert_eq!(pattern.bonds().len(), 1);
        assert!(matches!(pattern.bonds()[0].expr, BondExpr::And(_)));

        let ring = parse_pattern("*1[O,S,N]*1").unwrap();
        assert_eq!(ring.atoms().len(), 3);
        assert_eq!(ring.bonds().len(), 3);
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert_eq!(parse_pattern(""), Err(SmartsError::Empty));
        assert!(matches!(
            parse_pattern("[C"),
            Err(SmartsError::UnexpectedEnd)
        ));
        assert!(matches!(
            parse_pattern("C(C"),
            Err(SmartsError::UnbalancedParenthesis { .. })
        ));
        assert!(matches!(
            parse_pattern("C1CC"),
            Err(SmartsError::UnclosedRing { label: 1 })
        ));
        assert!(matches!(
            parse_pattern("[Qq]"),
            Err(SmartsError::UnknownElement { .. })
        ));
    }
}
