//! The fixed document grammar of XML-RPC.
//!
//! The grammar is data: a table of content models keyed by [`ContentType`].
//! Element declarations name the tag that may appear and the content type
//! it must satisfy, so the same tag can obey different rules depending on
//! where it appears (`params` holds any number of `param`s inside a call but
//! exactly one inside a response).
//!
//! The table is compiled once into a [`Grammar`] and cached for the life of
//! the process; see [`grammar`].

mod validate;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

/// Element and member names used on the wire.
pub mod tags {
    pub const METHOD_CALL: &str = "methodCall";
    pub const METHOD_RESPONSE: &str = "methodResponse";
    pub const METHOD_NAME: &str = "methodName";
    pub const PARAMS: &str = "params";
    pub const PARAM: &str = "param";
    pub const FAULT: &str = "fault";
    pub const VALUE: &str = "value";

    pub const INT: &str = "int";
    pub const I4: &str = "i4";
    pub const I8: &str = "i8";
    pub const DOUBLE: &str = "double";
    pub const BOOLEAN: &str = "boolean";
    pub const STRING: &str = "string";
    pub const DATETIME: &str = "dateTime.iso8601";
    pub const BASE64: &str = "base64";
    pub const NIL: &str = "nil";

    pub const ARRAY: &str = "array";
    pub const DATA: &str = "data";
    pub const STRUCT: &str = "struct";
    pub const MEMBER: &str = "member";
    pub const NAME: &str = "name";

    pub const FAULT_CODE: &str = "faultCode";
    pub const FAULT_STRING: &str = "faultString";
}

/// Named content types referenced by element declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// The document itself: exactly one root element.
    Document,
    MethodCall,
    CallParams,
    MethodResponse,
    ResponseParams,
    Param,
    Fault,
    /// The `value` under `fault`, which must hold a struct.
    FaultValue,
    Value,
    Array,
    Data,
    Struct,
    Member,
    /// Character data only.
    Text,
    /// Nothing but whitespace.
    Empty,
}

/// How often a declared element may occur within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    One,
    Optional,
    Many,
}

/// A declared child element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementDecl {
    pub tag: &'static str,
    pub content: ContentType,
    pub occurs: Occurs,
}

impl ElementDecl {
    pub const fn one(tag: &'static str, content: ContentType) -> Self {
        Self {
            tag,
            content,
            occurs: Occurs::One,
        }
    }

    pub const fn optional(tag: &'static str, content: ContentType) -> Self {
        Self {
            tag,
            content,
            occurs: Occurs::Optional,
        }
    }

    pub const fn many(tag: &'static str, content: ContentType) -> Self {
        Self {
            tag,
            content,
            occurs: Occurs::Many,
        }
    }
}

/// Content model of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Character data (entities and CDATA resolved); may be empty.
    Text,
    /// Whitespace only.
    Empty,
    /// Child elements in declaration order; whitespace between them is ignored.
    Sequence(&'static [ElementDecl]),
    /// Exactly one child element out of the alternatives.
    Choice(&'static [ElementDecl]),
    /// Either character data alone or exactly one of the alternatives.
    Mixed(&'static [ElementDecl]),
}

use ContentType as T;

const VALUE_TYPES: &[ElementDecl] = &[
    ElementDecl::one(tags::INT, T::Text),
    ElementDecl::one(tags::I4, T::Text),
    ElementDecl::one(tags::I8, T::Text),
    ElementDecl::one(tags::DOUBLE, T::Text),
    ElementDecl::one(tags::BOOLEAN, T::Text),
    ElementDecl::one(tags::STRING, T::Text),
    ElementDecl::one(tags::DATETIME, T::Text),
    ElementDecl::one(tags::BASE64, T::Text),
    ElementDecl::one(tags::NIL, T::Empty),
    ElementDecl::one(tags::ARRAY, T::Array),
    ElementDecl::one(tags::STRUCT, T::Struct),
];

/// The productions legal documents must satisfy.
pub const RULES: &[(ContentType, ContentModel)] = &[
    (
        T::Document,
        ContentModel::Choice(&[
            ElementDecl::one(tags::METHOD_CALL, T::MethodCall),
            ElementDecl::one(tags::METHOD_RESPONSE, T::MethodResponse),
        ]),
    ),
    (
        T::MethodCall,
        ContentModel::Sequence(&[
            ElementDecl::one(tags::METHOD_NAME, T::Text),
            ElementDecl::optional(tags::PARAMS, T::CallParams),
        ]),
    ),
    (
        T::CallParams,
        ContentModel::Sequence(&[ElementDecl::many(tags::PARAM, T::Param)]),
    ),
    (
        T::MethodResponse,
        ContentModel::Choice(&[
            ElementDecl::one(tags::PARAMS, T::ResponseParams),
            ElementDecl::one(tags::FAULT, T::Fault),
        ]),
    ),
    (
        T::ResponseParams,
        ContentModel::Sequence(&[ElementDecl::one(tags::PARAM, T::Param)]),
    ),
    (
        T::Param,
        ContentModel::Sequence(&[ElementDecl::one(tags::VALUE, T::Value)]),
    ),
    (
        T::Fault,
        ContentModel::Sequence(&[ElementDecl::one(tags::VALUE, T::FaultValue)]),
    ),
    (
        T::FaultValue,
        ContentModel::Choice(&[ElementDecl::one(tags::STRUCT, T::Struct)]),
    ),
    (T::Value, ContentModel::Mixed(VALUE_TYPES)),
    (
        T::Array,
        ContentModel::Sequence(&[ElementDecl::optional(tags::DATA, T::Data)]),
    ),
    (
        T::Data,
        ContentModel::Sequence(&[ElementDecl::many(tags::VALUE, T::Value)]),
    ),
    (
        T::Struct,
        ContentModel::Sequence(&[ElementDecl::many(tags::MEMBER, T::Member)]),
    ),
    (
        T::Member,
        ContentModel::Sequence(&[
            ElementDecl::one(tags::NAME, T::Text),
            ElementDecl::one(tags::VALUE, T::Value),
        ]),
    ),
    (T::Text, ContentModel::Text),
    (T::Empty, ContentModel::Empty),
];

/// Compiled grammar: the rule table indexed by content type.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: FxHashMap<ContentType, ContentModel>,
}

impl Grammar {
    /// Compiles [`RULES`] into a lookup table.
    ///
    /// Compilation is deterministic, so building it more than once yields
    /// identical grammars.
    pub fn compile() -> Self {
        let mut rules = FxHashMap::with_capacity_and_hasher(RULES.len(), Default::default());
        for (content_type, model) in RULES {
            rules.insert(*content_type, *model);
        }
        tracing::debug!(rules = rules.len(), "compiled xml-rpc grammar");
        Self { rules }
    }

    /// Returns the content model for `content_type`.
    pub fn rule(&self, content_type: ContentType) -> ContentModel {
        // Every content type has a rule; see test_every_content_type_has_a_rule.
        self.rules
            .get(&content_type)
            .copied()
            .unwrap_or(ContentModel::Empty)
    }

    /// Returns the tags allowed as document root.
    pub fn root_tags(&self) -> Vec<&'static str> {
        match self.rule(ContentType::Document) {
            ContentModel::Choice(decls) => decls.iter().map(|d| d.tag).collect(),
            _ => Vec::new(),
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::compile()
    }
}

lazy_static! {
    static ref GRAMMAR: Grammar = Grammar::compile();
}

/// Returns the process-wide compiled grammar.
pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: &[ContentType] = &[
        T::Document,
        T::MethodCall,
        T::CallParams,
        T::MethodResponse,
        T::ResponseParams,
        T::Param,
        T::Fault,
        T::FaultValue,
        T::Value,
        T::Array,
        T::Data,
        T::Struct,
        T::Member,
        T::Text,
        T::Empty,
    ];

    #[test]
    fn test_every_content_type_has_a_rule() {
        let grammar = Grammar::compile();
        for ty in ALL_TYPES {
            assert!(grammar.rules.contains_key(ty), "no rule for {:?}", ty);
        }
        assert_eq!(grammar.rules.len(), ALL_TYPES.len());
    }

    #[test]
    fn test_every_declared_content_type_is_defined() {
        let grammar = Grammar::compile();
        for (_, model) in RULES {
            let decls = match model {
                ContentModel::Sequence(d) | ContentModel::Choice(d) | ContentModel::Mixed(d) => *d,
                _ => continue,
            };
            for decl in decls {
                assert!(grammar.rules.contains_key(&decl.content), "{} undefined", decl.tag);
            }
        }
    }

    #[test]
    fn test_root_tags() {
        assert_eq!(grammar().root_tags(), vec!["methodCall", "methodResponse"]);
    }

    #[test]
    fn test_cached_grammar_is_shared() {
        let a = grammar() as *const Grammar;
        let b = grammar() as *const Grammar;
        assert_eq!(a, b);
    }

    #[test]
    fn test_concurrent_first_use() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| grammar().rule(ContentType::Value)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), ContentModel::Mixed(VALUE_TYPES));
        }
    }

    #[test]
    fn test_response_params_hold_one_param() {
        match grammar().rule(ContentType::ResponseParams) {
            ContentModel::Sequence(decls) => {
                assert_eq!(decls.len(), 1);
                assert_eq!(decls[0].occurs, Occurs::One);
            }
            other => panic!("unexpected model {:?}", other),
        }
    }
}
