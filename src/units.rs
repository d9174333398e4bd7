use derive_more::{Add, AddAssign, Display, Div, From, Into, Mul, Sub, SubAssign, Sum};

/// A measurement in PostScript points (1/72 of an inch), the native unit of
/// PDF user space. All layout in this crate is done in points.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Mul,
    Div,
    Sum,
    Display,
    From,
    Into,
)]
pub struct Pt(pub f32);

/// A measurement in inches, convertible to [Pt]
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, From, Into)]
pub struct In(pub f32);

/// A measurement in millimetres, convertible to [Pt]
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, From, Into)]
pub struct Mm(pub f32);

impl From<In> for Pt {
    fn from(value: In) -> Pt {
        Pt(value.0 * 72.0)
    }
}

impl From<Mm> for Pt {
    fn from(value: Mm) -> Pt {
        Pt(value.0 * 72.0 / 25.4)
    }
}

impl From<Pt> for In {
    fn from(value: Pt) -> In {
        In(value.0 / 72.0)
    }
}

impl From<Pt> for Mm {
    fn from(value: Pt) -> Mm {
        Mm(value.0 * 25.4 / 72.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_units() {
        let pt: Pt = In(1.0).into();
        assert_eq!(pt, Pt(72.0));
        let pt: Pt = Mm(25.4).into();
        assert!((pt.0 - 72.0).abs() < 1e-4);
    }

    #[test]
    fn point_arithmetic() {
        let mut y = Pt(100.0);
        y -= Pt(15.0);
        assert_eq!(y, Pt(85.0));
        assert_eq!(Pt(10.0) * 2.0, Pt(20.0));
        assert_eq!(Pt(10.0) / 2.0, Pt(5.0));
    }
}
