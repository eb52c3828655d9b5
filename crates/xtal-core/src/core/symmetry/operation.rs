use super::SymmetryError;
use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::str::FromStr;

/// A crystallographic symmetry operation `x' = R x + t` acting on fractional coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn inversion() -> Self {
        Self {
            rotation: -Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    #[inline]
    pub fn apply(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * fractional.coords + self.translation)
    }
}

impl FromStr for SymmetryOperation {
    type Err = SymmetryError;

    /// Parses the Jones-faithful `x,y,z` notation, e.g. `-x+1/2,y,-z`.
    ///
    /// Each of the three comma-separated components defines one row of the rotation
    /// plus a translation; translations may be integers, fractions or decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| SymmetryError::InvalidOperation {
            operation: s.to_string(),
            reason,
        };

        let components: Vec<&str> = s.split(',').map(str::trim).collect();
        if components.len() != 3 {
            return Err(invalid(format!(
                "expected 3 components, found {}",
                components.len()
            )));
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, component) in components.iter().enumerate() {
            let (coefficients, shift) = parse_component(component).map_err(invalid)?;
            for column in 0..3 {
                rotation[(row, column)] = coefficients[column];
            }
            translation[row] = shift;
        }

        if rotation.determinant().abs() < 0.5 {
            return Err(invalid("rotation part is singular".to_string()));
        }

        Ok(Self {
            rotation,
            translation,
        })
    }
}

fn parse_component(component: &str) -> Result<([f64; 3], f64), String> {
    let mut coefficients = [0.0; 3];
    let mut shift = 0.0;
    let chars: Vec<char> = component.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() {
        return Err("empty component".to_string());
    }

    let mut i = 0;
    while i < chars.len() {
        let sign = match chars[i] {
            '-' => {
                i += 1;
                -1.0
            }
            '+' => {
                i += 1;
                1.0
            }
            _ => 1.0,
        };
        let Some(&c) = chars.get(i) else {
            return Err(format!("dangling sign in '{component}'"));
        };

        match c.to_ascii_lowercase() {
            axis @ ('x' | 'y' | 'z') => {
                coefficients[(axis as u8 - b'x') as usize] += sign;
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '/')
                {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                shift += sign * parse_number(&literal)?;
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok((coefficients, shift))
}

fn parse_number(literal: &str) -> Result<f64, String> {
    let parse = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| format!("invalid number '{literal}'"))
    };
    match literal.split_once('/') {
        Some((numerator, denominator)) => {
            let denominator = parse(denominator)?;
            if denominator == 0.0 {
                return Err(format!("zero denominator in '{literal}'"));
            }
            Ok(parse(numerator)? / denominator)
        }
        None => parse(literal),
    }
}

impl fmt::Display for SymmetryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const AXES: [char; 3] = ['x', 'y', 'z'];
        let mut rows = Vec::with_capacity(3);
        for row in 0..3 {
            let mut text = String::new();
            for (column, axis) in AXES.iter().enumerate() {
                let coefficient = self.rotation[(row, column)].round() as i32;
                match coefficient {
                    0 => {}
                    1 if text.is_empty() => text.push(*axis),
                    1 => text.push_str(&format!("+{axis}")),
                    -1 => text.push_str(&format!("-{axis}")),
                    n if n > 0 && !text.is_empty() => text.push_str(&format!("+{n}{axis}")),
                    n => text.push_str(&format!("{n}{axis}")),
                }
            }
            let shift = self.translation[row];
            if shift.abs() > 1e-9 {
                text.push_str(&format_shift(shift));
            }
            rows.push(text);
        }
        write!(f, "{}", rows.join(","))
    }
}

fn format_shift(shift: f64) -> String {
    let sign = if shift < 0.0 { '-' } else { '+' };
    let magnitude = shift.abs();
    for denominator in [2, 3, 4, 6, 8, 12] {
        let numerator = magnitude * f64::from(denominator);
        if (numerator - numerator.round()).abs() < 1e-6 {
            let numerator = numerator.round() as i32;
            return if numerator % denominator == 0 {
                format!("{sign}{}", numerator / denominator)
            } else {
                format!("{sign}{numerator}/{denominator}")
            };
        }
    }
    format!("{sign}{magnitude}")
}
