//! Custom MDX components with print semantics.
//!
//! Elements are identified once, when the tree is built, so the renderer
//! dispatches on a closed enum instead of comparing names.

use compact_str::CompactString;

/// Custom element recognized by the LaTeX renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// `<Problem title="...">`: numbered exercise
    Problem,
    /// `<Graph data={...} xKey="t" yKey="v" />`: line chart
    Graph,
    /// `<Solution>`: worked answer, web only
    Solution,
    /// `<ProblemSet>`: paginated group of problems on the web
    ProblemSet,
    /// `<EquationBox>`: table of formulas
    EquationBox,
    /// `<EqRow>`: one formula row of an `EquationBox`
    EqRow,
    /// Any other capitalized tag; children are still rendered
    Unknown(CompactString),
}

impl Component {
    /// Identify a component from its tag name.
    pub fn identify(name: &str) -> Self {
        match name {
            "Problem" => Self::Problem,
            "Graph" => Self::Graph,
            "Solution" => Self::Solution,
            "ProblemSet" => Self::ProblemSet,
            "EquationBox" => Self::EquationBox,
            "EqRow" => Self::EqRow,
            other => Self::Unknown(CompactString::from(other)),
        }
    }

    /// Tag name as written in MDX.
    pub fn name(&self) -> &str {
        match self {
            Self::Problem => "Problem",
            Self::Graph => "Graph",
            Self::Solution => "Solution",
            Self::ProblemSet => "ProblemSet",
            Self::EquationBox => "EquationBox",
            Self::EqRow => "EqRow",
            Self::Unknown(name) => name,
        }
    }

    /// Check if this is one of the recognized components
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Whether content under this component is left out of print output.
    pub fn is_web_only(&self) -> bool {
        matches!(self, Self::Solution)
    }
}
