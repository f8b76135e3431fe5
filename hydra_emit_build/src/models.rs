/// Where a manifest block attaches its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSource {
    Package { name: String },
    /// A bean type, given as a Rust type path.
    Class { path: String },
    /// A mixin type and the bean type it applies to.
    Mixin { path: String, target: String },
}

impl ScopeSource {
    pub fn describe(&self) -> String {
        match self {
            ScopeSource::Package { name } => format!("package \"{}\"", name),
            ScopeSource::Class { path } => format!("class \"{}\"", path),
            ScopeSource::Mixin { path, target } => {
                format!("mixin \"{}\" for \"{}\"", path, target)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDeclaration {
    pub define: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDeclaration {
    pub name: String,
    pub expose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScope {
    pub source: ScopeSource,
    pub vocab: Option<String>,
    pub expose: Option<String>,
    pub term: Option<TermDeclaration>,
    pub terms: Option<Vec<TermDeclaration>>,
    pub package: Option<String>,
    pub fields: Vec<MemberDeclaration>,
    pub accessors: Vec<MemberDeclaration>,
}

impl ParsedScope {
    pub fn empty(source: ScopeSource) -> Self {
        ParsedScope {
            source,
            vocab: None,
            expose: None,
            term: None,
            terms: None,
            package: None,
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }
}
