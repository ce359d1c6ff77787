/// Constant-or-resolver configuration values

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A value that is either fixed or computed from caller-supplied arguments.
pub enum Resolvable<T, A: ?Sized> {
    Constant(T),
    Resolver(Rc<dyn Fn(&A) -> T>),
}

impl<T: Clone, A: ?Sized> Resolvable<T, A> {
    /// Wrap a closure as a resolver
    pub fn resolver(f: impl Fn(&A) -> T + 'static) -> Self {
        Resolvable::Resolver(Rc::new(f))
    }

    pub fn resolve(&self, args: &A) -> T {
        match self {
            Resolvable::Constant(value) => value.clone(),
            Resolvable::Resolver(f) => f(args),
        }
    }
}

impl<T: Clone, A: ?Sized> Clone for Resolvable<T, A> {
    fn clone(&self) -> Self {
        match self {
            Resolvable::Constant(value) => Resolvable::Constant(value.clone()),
            Resolvable::Resolver(f) => Resolvable::Resolver(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug, A: ?Sized> fmt::Debug for Resolvable<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolvable::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Resolvable::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Position a local sound is emitted from
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
}

impl Location {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Location) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Multiplier applied to local sounds, given where they play
pub type LocalVolume = Resolvable<f32, Option<Location>>;

/// Theme name used when none is given; resolvers receive the last theme played
pub type ThemeDefault = Resolvable<String, Option<String>>;

impl LocalVolume {
    /// Linear falloff from full volume at `listener` to silence at `radius`.
    pub fn linear_falloff(listener: Location, radius: f32) -> Self {
        Resolvable::resolver(move |location: &Option<Location>| match location {
            Some(at) if radius > 0.0 => (1.0 - at.distance_to(&listener) / radius).clamp(0.0, 1.0),
            Some(_) => 0.0,
            None => 1.0,
        })
    }
}

impl Default for LocalVolume {
    fn default() -> Self {
        Resolvable::Constant(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_arguments() {
        let volume: LocalVolume = Resolvable::Constant(0.4);
        assert_eq!(volume.resolve(&None), 0.4);
        assert_eq!(volume.resolve(&Some(Location::new(3.0, 4.0))), 0.4);
    }

    #[test]
    fn test_resolver_receives_arguments() {
        let theme: ThemeDefault = Resolvable::resolver(|last: &Option<String>| match last.as_deref() {
            Some("day") => "night".to_string(),
            _ => "day".to_string(),
        });

        assert_eq!(theme.resolve(&None), "day");
        assert_eq!(theme.resolve(&Some("day".to_string())), "night");
    }

    #[test]
    fn test_linear_falloff() {
        let volume = LocalVolume::linear_falloff(Location::new(0.0, 0.0), 10.0);

        assert_eq!(volume.resolve(&None), 1.0);
        assert_eq!(volume.resolve(&Some(Location::new(0.0, 0.0))), 1.0);
        assert!((volume.resolve(&Some(Location::new(3.0, 4.0))) - 0.5).abs() < 1e-6);
        assert_eq!(volume.resolve(&Some(Location::new(30.0, 40.0))), 0.0);
    }

    #[test]
    fn test_clone_shares_resolver() {
        let volume = LocalVolume::linear_falloff(Location::default(), 2.0);
        let copy = volume.clone();
        assert_eq!(copy.resolve(&Some(Location::new(1.0, 0.0))), 0.5);
        assert_eq!(format!("{:?}", copy), "Resolver(..)");
    }
}
