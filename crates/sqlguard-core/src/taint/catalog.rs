//! Sink catalog: which call shapes consume raw query text
//!
//! The catalog is a data-driven table of sink signatures. Each signature
//! names a dotted callee pattern (`*.query`, `sequelize.query`), the
//! argument positions that carry query text, and optionally the position of
//! a bind-parameter argument. The rest of the engine is agnostic to
//! concrete library names; new ORMs and drivers are added by inserting
//! signatures, either in code or from `[[sinks]]` configuration entries.

use std::collections::{HashMap, HashSet};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate sink pattern '{0}'")]
    DuplicatePattern(String),
    #[error("invalid sink pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// One segment of a call's dotted callee chain as observed in source.
/// `Dynamic` stands for a segment that is not a plain identifier (a call
/// result, `this`, a computed property); only wildcards match it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainSegment {
    Name(String),
    Dynamic,
}

impl ChainSegment {
    pub fn name(name: &str) -> Self {
        ChainSegment::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Name(String),
    Wildcard,
}

/// A parsed callee pattern such as `*.query` or `sequelize.query`.
///
/// Matching is structural and suffix-based: the pattern is aligned against
/// the tail of the callee chain, and `*` matches exactly one segment of any
/// kind. Longer and more literal patterns are preferred when several match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalleePattern {
    segments: Vec<PatternSegment>,
    raw: String,
}

impl CalleePattern {
    pub fn parse(pattern: &str) -> Result<Self, CatalogError> {
        if pattern.is_empty() {
            return Err(CatalogError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }

        let segments = pattern
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    Err(CatalogError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: "pattern contains an empty segment".to_string(),
                    })
                } else if segment == "*" {
                    Ok(PatternSegment::Wildcard)
                } else {
                    Ok(PatternSegment::Name(segment.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            segments,
            raw: pattern.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, chain: &[ChainSegment]) -> bool {
        if self.segments.len() > chain.len() {
            return false;
        }

        let tail = &chain[chain.len() - self.segments.len()..];
        self.segments
            .iter()
            .zip(tail)
            .all(|(pattern, actual)| match (pattern, actual) {
                (PatternSegment::Wildcard, _) => true,
                (PatternSegment::Name(expected), ChainSegment::Name(name)) => expected == name,
                (PatternSegment::Name(_), ChainSegment::Dynamic) => false,
            })
    }

    /// Ordering key for tie-breaking: literal segments first, then length.
    fn specificity(&self) -> (usize, usize) {
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, PatternSegment::Name(_)))
            .count();
        (literals, self.segments.len())
    }

    fn last_literal(&self) -> Option<&str> {
        match self.segments.last() {
            Some(PatternSegment::Name(name)) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSignature {
    pub pattern: CalleePattern,
    /// Argument positions holding query text.
    pub query_args: Vec<usize>,
    /// Position of a bind-parameter argument, when the API accepts one. A
    /// call whose query text is a static literal and which passes this
    /// argument is inherently safe.
    pub param_arg: Option<usize>,
    pub description: String,
}

impl SinkSignature {
    pub fn new(
        pattern: &str,
        query_args: Vec<usize>,
        param_arg: Option<usize>,
        description: &str,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            pattern: CalleePattern::parse(pattern)?,
            query_args,
            param_arg,
            description: description.to_string(),
        })
    }
}

/// Registry of sink signatures with structural lookup.
#[derive(Debug, Default)]
pub struct SinkCatalog {
    signatures: Vec<SinkSignature>,
    /// Signature indices keyed by the pattern's final literal segment; the
    /// invoked member name narrows the candidate set before full matching.
    tail_index: HashMap<String, Vec<usize>>,
    /// Signatures whose pattern ends in a wildcard; always candidates.
    wildcard_tails: Vec<usize>,
    seen_patterns: HashSet<String>,
}

impl SinkCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in signature set: generic driver/pool/client query calls,
    /// query-builder raw fragments, prepared statements, and the raw-query
    /// surfaces of common ORMs.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();

        let defaults = [
            ("*.query", vec![0], Some(1), "database query execution"),
            ("sequelize.query", vec![0], None, "Sequelize raw query"),
            ("*.prepare", vec![0], None, "prepared statement creation"),
            ("*.raw", vec![0], Some(1), "query builder raw fragment"),
            ("*.$queryRaw", vec![0], None, "Prisma raw query"),
            ("*.$executeRaw", vec![0], None, "Prisma raw execute"),
            ("*.$queryRawUnsafe", vec![0], Some(1), "Prisma unsafe raw query"),
            ("*.$executeRawUnsafe", vec![0], Some(1), "Prisma unsafe raw execute"),
        ];

        for (pattern, query_args, param_arg, description) in defaults {
            let signature = SinkSignature::new(pattern, query_args, param_arg, description)
                .expect("built-in sink pattern is well-formed");
            catalog
                .insert(signature)
                .expect("built-in sink patterns are unique");
        }

        // `execute` is only a sink on well-known connection objects: on an
        // arbitrary receiver it is the run step of a prepared statement,
        // whose query text was already checked at `prepare` time.
        for object in ["db", "database", "connection", "conn", "pool", "client"] {
            let pattern = format!("{object}.execute");
            let signature =
                SinkSignature::new(&pattern, vec![0], Some(1), "database query execution")
                    .expect("built-in sink pattern is well-formed");
            catalog
                .insert(signature)
                .expect("built-in sink patterns are unique");
        }

        catalog
    }

    /// Insert a signature, rejecting a pattern that is already present.
    /// The duplicate check runs at catalog construction, before any file
    /// analysis begins.
    pub fn insert(&mut self, signature: SinkSignature) -> Result<(), CatalogError> {
        let raw = signature.pattern.as_str().to_string();
        if !self.seen_patterns.insert(raw.clone()) {
            return Err(CatalogError::DuplicatePattern(raw));
        }

        let index = self.signatures.len();
        match signature.pattern.last_literal() {
            Some(name) => self
                .tail_index
                .entry(name.to_string())
                .or_default()
                .push(index),
            None => self.wildcard_tails.push(index),
        }

        self.signatures.push(signature);
        Ok(())
    }

    /// Find the signature matching a callee chain, preferring the most
    /// specific pattern when several match.
    pub fn lookup(&self, chain: &[ChainSegment]) -> Option<&SinkSignature> {
        let last = chain.last()?;

        let mut candidates: Vec<usize> = Vec::new();
        if let ChainSegment::Name(name) = last {
            if let Some(indices) = self.tail_index.get(name) {
                candidates.extend_from_slice(indices);
            }
        }
        candidates.extend_from_slice(&self.wildcard_tails);

        candidates
            .into_iter()
            .map(|i| &self.signatures[i])
            .filter(|sig| sig.pattern.matches(chain))
            .max_by_key(|sig| sig.pattern.specificity())
    }

    pub fn signatures(&self) -> &[SinkSignature] {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
