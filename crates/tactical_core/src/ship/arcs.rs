//! Directional arcs and per-arc values.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the four 90 degree zones around a ship, relative to its facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Arc {
    /// Dead ahead, within 45 degrees either side.
    Fore,
    /// Right side.
    Starboard,
    /// Behind.
    Aft,
    /// Left side.
    Port,
}

impl Arc {
    /// All arcs, clockwise from fore.
    pub const ALL: [Arc; 4] = [Arc::Fore, Arc::Starboard, Arc::Aft, Arc::Port];

    /// Bucket a relative bearing (degrees clockwise from the bow) into an arc.
    ///
    /// Boundaries belong to the side arcs except exactly 45 and 315, which
    /// count as fore.
    #[must_use]
    pub fn from_relative_bearing(degrees: f64) -> Self {
        let rel = degrees.rem_euclid(360.0);
        if rel <= 45.0 || rel >= 315.0 {
            Arc::Fore
        } else if rel <= 135.0 {
            Arc::Starboard
        } else if rel <= 225.0 {
            Arc::Aft
        } else {
            Arc::Port
        }
    }

    /// Lowercase arc name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Arc::Fore => "fore",
            Arc::Starboard => "starboard",
            Arc::Aft => "aft",
            Arc::Port => "port",
        }
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value for each arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArcMap<T> {
    /// Fore value.
    pub fore: T,
    /// Aft value.
    pub aft: T,
    /// Port value.
    pub port: T,
    /// Starboard value.
    pub starboard: T,
}

impl<T: Copy> ArcMap<T> {
    /// Same value on every arc.
    #[must_use]
    pub const fn uniform(value: T) -> Self {
        Self {
            fore: value,
            aft: value,
            port: value,
            starboard: value,
        }
    }

    /// Explicit per-arc values.
    #[must_use]
    pub const fn new(fore: T, aft: T, port: T, starboard: T) -> Self {
        Self {
            fore,
            aft,
            port,
            starboard,
        }
    }

    /// Iterate `(arc, value)` clockwise from fore.
    pub fn iter(&self) -> impl Iterator<Item = (Arc, T)> + '_ {
        Arc::ALL.iter().map(|a| (*a, self[*a]))
    }

    /// Apply `f` to every arc.
    #[must_use]
    pub fn map<U: Copy>(&self, mut f: impl FnMut(Arc, T) -> U) -> ArcMap<U> {
        ArcMap {
            fore: f(Arc::Fore, self.fore),
            aft: f(Arc::Aft, self.aft),
            port: f(Arc::Port, self.port),
            starboard: f(Arc::Starboard, self.starboard),
        }
    }
}

impl<T> Index<Arc> for ArcMap<T> {
    type Output = T;

    fn index(&self, arc: Arc) -> &T {
        match arc {
            Arc::Fore => &self.fore,
            Arc::Aft => &self.aft,
            Arc::Port => &self.port,
            Arc::Starboard => &self.starboard,
        }
    }
}

impl<T> IndexMut<Arc> for ArcMap<T> {
    fn index_mut(&mut self, arc: Arc) -> &mut T {
        match arc {
            Arc::Fore => &mut self.fore,
            Arc::Aft => &mut self.aft,
            Arc::Port => &mut self.port,
            Arc::Starboard => &mut self.starboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_buckets() {
        assert_eq!(Arc::from_relative_bearing(0.0), Arc::Fore);
        assert_eq!(Arc::from_relative_bearing(45.0), Arc::Fore);
        assert_eq!(Arc::from_relative_bearing(60.0), Arc::Starboard);
        assert_eq!(Arc::from_relative_bearing(180.0), Arc::Aft);
        assert_eq!(Arc::from_relative_bearing(240.0), Arc::Port);
        assert_eq!(Arc::from_relative_bearing(315.0), Arc::Fore);
        assert_eq!(Arc::from_relative_bearing(-60.0), Arc::Port);
    }

    #[test]
    fn test_arc_map_index() {
        let mut m = ArcMap::new(1, 2, 3, 4);
        assert_eq!(m[Arc::Fore], 1);
        assert_eq!(m[Arc::Starboard], 4);
        m[Arc::Aft] = 9;
        assert_eq!(m.aft, 9);
        let doubled = m.map(|_, v| v * 2);
        assert_eq!(doubled[Arc::Port], 6);
        assert_eq!(m.iter().count(), 4);
    }
}
