use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship<C> {
    pub strength: Strength,

    #[serde(default)]
    pub strength_direction: Direction,

    pub source: Constraint<C>,

    pub target: Constraint<C>,
}

/// One end of a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint<C> {
    pub multiplicity: Multiplicity,

    #[serde(default = "default_polymorphic")]
    pub polymorphic: bool,

    pub classes: Vec<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplicity {
    pub lower: u32,

    /// `None` means unbounded.
    pub upper: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Referencing,
    Holding,
    Embedding,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum End {
    Source,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

fn default_polymorphic() -> bool {
    true
}

impl<C> Relationship<C> {
    pub fn new(strength: Strength, source: Constraint<C>, target: Constraint<C>) -> Self {
        Relationship {
            strength,
            strength_direction: Direction::Forward,
            source,
            target,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.strength_direction = direction;
        self
    }

    pub fn constraint(&self, end: End) -> &Constraint<C> {
        match end {
            End::Source => &self.source,
            End::Target => &self.target,
        }
    }

    /// The source multiplicity bounds how many sources relate to one target,
    /// so a single-valued source with a many-valued target is one-to-many.
    pub fn cardinality(&self) -> Cardinality {
        match (self.source.multiplicity.is_many(), self.target.multiplicity.is_many()) {
            (false, false) => Cardinality::OneToOne,
            (false, true) => Cardinality::OneToMany,
            (true, false) => Cardinality::ManyToOne,
            (true, true) => Cardinality::ManyToMany,
        }
    }
}

impl<C> Constraint<C> {
    pub fn new(multiplicity: Multiplicity, classes: impl IntoIterator<Item = C>) -> Self {
        Constraint {
            multiplicity,
            polymorphic: true,
            classes: classes.into_iter().collect(),
        }
    }

    pub fn non_polymorphic(mut self) -> Self {
        self.polymorphic = false;
        self
    }
}

impl Multiplicity {
    pub const ZERO_ONE: Multiplicity = Multiplicity {
        lower: 0,
        upper: Some(1),
    };

    pub const ONE: Multiplicity = Multiplicity {
        lower: 1,
        upper: Some(1),
    };

    pub const ZERO_MANY: Multiplicity = Multiplicity {
        lower: 0,
        upper: None,
    };

    pub const ONE_MANY: Multiplicity = Multiplicity {
        lower: 1,
        upper: None,
    };

    pub fn is_many(self) -> bool {
        !matches!(self.upper, Some(upper) if upper <= 1)
    }
}

impl End {
    pub fn opposite(self) -> End {
        match self {
            End::Source => End::Target,
            End::Target => End::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            End::Source => "source",
            End::Target => "target",
        }
    }
}
