bitflags::bitflags! {
    /// Granularity at which a cached value is shared or isolated.
    ///
    /// A scope selects which components of a [`CacheKey`](super::CacheKey)
    /// are held fixed when matching an existing entry; components outside the
    /// scope are normalized away, so requests that differ only in them share
    /// one slot.
    ///
    /// The generation number and the evolution stage are always part of a
    /// key. `GENERATION` is therefore implied by every scope and is carried so
    /// that scope declarations read as intended.
    ///
    /// ```
    /// use metaheur::caching::Scope;
    ///
    /// let shared = Scope::GENERATION | Scope::META_HEURISTIC;
    /// assert!(shared.contains(Scope::META_HEURISTIC));
    /// assert!(!shared.contains(Scope::INDIVIDUAL));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Scope: u8 {
        /// One value per generation and stage.
        const GENERATION = 1 << 0;
        /// One value per individual index.
        const INDIVIDUAL = 1 << 1;
        /// One value per heuristic instance.
        const META_HEURISTIC = 1 << 2;
        /// One value per worker thread.
        const THREAD = 1 << 3;
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::empty()
    }
}

impl Scope {
    /// Whether the heuristic identity is part of the key.
    pub fn per_heuristic(self) -> bool {
        self.contains(Scope::META_HEURISTIC)
    }

    /// Whether the individual index is part of the key.
    pub fn per_individual(self) -> bool {
        self.contains(Scope::INDIVIDUAL)
    }

    /// Whether the current thread is part of the key.
    pub fn per_thread(self) -> bool {
        self.contains(Scope::THREAD)
    }
}
