use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::sync::Mutex;
use bit_set::BitSet;

/// Error type for API misuse and broken solver invariants. Contradictions and
/// exhaustion of the search space are expected outcomes, not errors, and are
/// never reported through this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(Cow<'static, str>);
impl Error {
    pub const fn new_const(s: &'static str) -> Self {
        Error(Cow::Borrowed(s))
    }

    pub fn new<S: Into<String>>(s: S) -> Self {
        Error(Cow::Owned(s.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cell coordinate, row-major, 0-indexed.
pub type Index = [usize; 2];

/// A concrete cell value in 1..=N, where N is the grid size. The upper bound
/// is not carried in the type; containers that need it (`ValSet`,
/// `CandidateGrid`) carry a cardinality instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Val(u8);

impl Val {
    pub fn new(v: u8) -> Self {
        assert!(v >= 1, "cell values start at 1");
        Val(v)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// 0-based position used by bitset containers.
    pub fn ordinal(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn from_ordinal(ord: usize) -> Self {
        Val(ord as u8 + 1)
    }
}

impl Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of candidate values for one cell, backed by a bitset so that
/// membership, removal, and size queries are constant-time. Iteration yields
/// values in ascending order, which is what makes branching deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValSet {
    bits: BitSet,
    cardinality: usize,
}

impl ValSet {
    pub fn empty(cardinality: usize) -> Self {
        ValSet { bits: BitSet::with_capacity(cardinality), cardinality }
    }

    pub fn full(cardinality: usize) -> Self {
        let mut s = Self::empty(cardinality);
        for i in 0..cardinality {
            s.bits.insert(i);
        }
        s
    }

    pub fn singleton(cardinality: usize, v: Val) -> Self {
        let mut s = Self::empty(cardinality);
        s.insert(v);
        s
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn insert(&mut self, v: Val) {
        debug_assert!(v.ordinal() < self.cardinality);
        self.bits.insert(v.ordinal());
    }

    pub fn remove(&mut self, v: Val) {
        self.bits.remove(v.ordinal());
    }

    pub fn contains(&self, v: Val) -> bool {
        self.bits.contains(v.ordinal())
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn intersect_with(&mut self, other: &ValSet) {
        self.bits.intersect_with(&other.bits);
    }

    pub fn iter(&self) -> impl Iterator<Item = Val> + '_ {
        self.bits.iter().map(Val::from_ordinal)
    }

    pub fn first(&self) -> Option<Val> {
        self.iter().next()
    }

    /// The single remaining value, if exactly one is left.
    pub fn as_singleton(&self) -> Option<Val> {
        if self.len() == 1 { self.first() } else { None }
    }

    pub fn to_vec(&self) -> Vec<Val> {
        self.iter().collect()
    }
}

struct AttributionRegistry {
    mapping: HashMap<&'static str, usize>,
    next_id: usize,
}

impl AttributionRegistry {
    fn new() -> Self {
        Self { mapping: HashMap::new(), next_id: 0 }
    }

    fn register(&mut self, name: &'static str) -> usize {
        if let Some(id) = self.mapping.get(name) {
            *id
        } else {
            let id = self.next_id;
            self.mapping.insert(name, id);
            self.next_id += 1;
            id
        }
    }
}

lazy_static::lazy_static! {
    static ref ATTRIBUTION_REGISTRY: Mutex<AttributionRegistry> = {
        Mutex::new(AttributionRegistry::new())
    };
}

/// An interned label identifying which rule produced a contradiction, a
/// certainty, or a branch decision. Comparisons go through the interned id;
/// the name is kept for messages and test assertions.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Attribution {
    name: &'static str,
    id: usize,
}

impl Attribution {
    pub fn new(name: &'static str) -> Self {
        let id = ATTRIBUTION_REGISTRY.lock().unwrap().register(name);
        Attribution { name, id }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Attribution {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Attribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A forced assignment: the given cell must take the given value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertainDecision {
    pub index: Index,
    pub value: Val,
}

impl CertainDecision {
    pub fn new(index: Index, value: Val) -> Self {
        Self { index, value }
    }
}

/// Constraint checks and ranking short-circuit as soon as they hit either a
/// contradiction or a certainty.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintResult {
    Contradiction(Attribution),
    Certainty(CertainDecision, Attribution),
    Ok,
}

impl ConstraintResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConstraintResult::Ok)
    }
}

/// A decision point in the search: a cell, the ordered list of values to try
/// there, and a cursor over them. An empty branch point means there is nothing
/// left to decide (the grid is complete).
#[derive(Debug, Clone)]
pub struct BranchPoint {
    pub branch_step: usize,
    pub attribution: Attribution,
    choices: Option<(Index, Vec<Val>, usize)>,
}

impl BranchPoint {
    pub fn empty(step: usize, attribution: Attribution) -> Self {
        BranchPoint { branch_step: step, attribution, choices: None }
    }

    /// A branch with exactly one choice, i.e. a forced move.
    pub fn unique(step: usize, attribution: Attribution, index: Index, value: Val) -> Self {
        Self::for_cell(step, attribution, index, vec![value])
    }

    pub fn for_cell(step: usize, attribution: Attribution, index: Index, values: Vec<Val>) -> Self {
        if values.is_empty() {
            panic!("Cannot create a BranchPoint for a cell with no values");
        }
        BranchPoint { branch_step: step, attribution, choices: Some((index, values, 0)) }
    }

    pub fn chosen(&self) -> Option<(Index, Val)> {
        self.choices.as_ref().map(|(i, vs, c)| (*i, vs[*c]))
    }

    pub fn remaining(&self) -> usize {
        match &self.choices {
            None => 0,
            Some((_, vs, c)) => vs.len() - 1 - c,
        }
    }

    /// Move the cursor to the next untried value, returning it, or None when
    /// the alternatives are exhausted.
    pub fn advance(&mut self) -> Option<(Index, Val)> {
        match &mut self.choices {
            None => None,
            Some((i, vs, c)) => {
                if *c + 1 < vs.len() {
                    *c += 1;
                    Some((*i, vs[*c]))
                } else {
                    None
                }
            }
        }
    }
}

/// An N×N grid of candidate sets: everything not yet ruled out for each cell.
/// Constraints narrow it; the ranker reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGrid {
    size: usize,
    cells: Box<[ValSet]>,
}

impl CandidateGrid {
    /// Every cell starts with the full 1..=size range.
    pub fn full(size: usize) -> Self {
        Self {
            size,
            cells: vec![ValSet::full(size); size * size].into_boxed_slice(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, index: Index) -> &ValSet {
        &self.cells[index[0] * self.size + index[1]]
    }

    pub fn get_mut(&mut self, index: Index) -> &mut ValSet {
        &mut self.cells[index[0] * self.size + index[1]]
    }

    pub fn set_singleton(&mut self, index: Index, v: Val) {
        *self.get_mut(index) = ValSet::singleton(self.size, v);
    }
}

/// Components that track the grid as it changes (the board itself, incremental
/// constraint state) implement this. Defaults are no-ops so that stateless
/// constraints stay trivial.
pub trait Stateful {
    fn reset(&mut self) {}
    fn apply(&mut self, index: Index, value: Val) -> Result<(), Error> {
        let _ = index;
        let _ = value;
        Ok(())
    }
    fn undo(&mut self, index: Index, value: Val) -> Result<(), Error> {
        let _ = index;
        let _ = value;
        Ok(())
    }
}
