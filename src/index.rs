// src/index.rs

use crate::error::Result;
use crate::model::{MethodDescriptor, MethodKey};
use crate::parser::SourceParser;

/// All method declarations of one file version, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodIndex {
    methods: Vec<MethodDescriptor>,
}

impl MethodIndex {
    /// Parse `text` (the content of `path` in some version) into an index.
    /// A parse failure yields no index at all.
    pub fn build<P: SourceParser + ?Sized>(parser: &P, path: &str, text: &str) -> Result<Self> {
        let methods = parser
            .parse_methods(path, text)?
            .into_iter()
            .map(|m| {
                MethodDescriptor::new(
                    path,
                    MethodKey::new(m.name, m.parameter_types),
                    m.start_line,
                    m.end_line,
                )
            })
            .collect();
        Ok(Self { methods })
    }

    pub fn from_methods(methods: Vec<MethodDescriptor>) -> Self {
        Self { methods }
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn into_methods(self) -> Vec<MethodDescriptor> {
        self.methods
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// The method whose inclusive span holds `line`.
    ///
    /// Overlapping spans (a declaration nested in another) resolve to the
    /// innermost, i.e. smallest, span; equal spans resolve to the first one
    /// declared. `None` is an ordinary answer for lines outside any method.
    pub fn resolve(&self, line: usize) -> Option<&MethodDescriptor> {
        self.methods
            .iter()
            .filter(|m| m.contains(line))
            .min_by_key(|m| m.length_in_lines())
    }
}

/// One-shot lookup: parse `text` and resolve `line` against it.
pub fn find_method_owner<P: SourceParser + ?Sized>(
    parser: &P,
    path: &str,
    text: &str,
    line: usize,
) -> Result<Option<MethodDescriptor>> {
    let index = MethodIndex::build(parser, path, text)?;
    Ok(index.resolve(line).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::SpanParser;
    use proptest::prelude::*;

    fn method(name: &str, start: usize, end: usize) -> MethodDescriptor {
        MethodDescriptor::new("F.cs", MethodKey::new(name, vec![]), start, end)
    }

    #[test]
    fn test_build_keeps_declaration_order() {
        let text = "bar(int) 5-9\nfoo() 0-4\n";
        let index = MethodIndex::build(&SpanParser, "F.cs", text).unwrap();

        let signatures: Vec<_> = index.methods().iter().map(|m| m.signature()).collect();
        assert_eq!(signatures, vec!["bar(int)", "foo()"]);
        assert!(index.methods().iter().all(|m| m.file_path == "F.cs"));
    }

    #[test]
    fn test_build_with_no_methods_is_empty() {
        let index = MethodIndex::build(&SpanParser, "F.cs", "just text").unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_build_propagates_parse_error() {
        let result = MethodIndex::build(&SpanParser, "F.cs", "foo() 0-4\n!error\n");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_resolve_inclusive_bounds() {
        let index = MethodIndex::from_methods(vec![method("foo", 0, 4), method("bar", 5, 9)]);

        assert_eq!(index.resolve(0).unwrap().key.name, "foo");
        assert_eq!(index.resolve(4).unwrap().key.name, "foo");
        assert_eq!(index.resolve(5).unwrap().key.name, "bar");
        assert_eq!(index.resolve(9).unwrap().key.name, "bar");
        assert!(index.resolve(10).is_none());
    }

    #[test]
    fn test_resolve_prefers_innermost_span() {
        let index = MethodIndex::from_methods(vec![
            method("outer", 0, 20),
            method("local", 5, 8),
            method("sibling", 10, 12),
        ]);

        assert_eq!(index.resolve(6).unwrap().key.name, "local");
        assert_eq!(index.resolve(11).unwrap().key.name, "sibling");
        assert_eq!(index.resolve(9).unwrap().key.name, "outer");
    }

    #[test]
    fn test_resolve_identical_spans_takes_first_declared() {
        let index = MethodIndex::from_methods(vec![method("first", 3, 6), method("second", 3, 6)]);
        assert_eq!(index.resolve(4).unwrap().key.name, "first");
    }

    #[test]
    fn test_find_method_owner_not_found_is_ok() {
        let owner = find_method_owner(&SpanParser, "F.cs", "foo() 2-4\n", 0).unwrap();
        assert!(owner.is_none());

        let owner = find_method_owner(&SpanParser, "F.cs", "foo() 2-4\n", 3).unwrap();
        assert_eq!(owner.unwrap().signature(), "foo()");
    }

    fn disjoint_spans() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0usize..5, 0usize..6), 1..8).prop_map(|gaps| {
            let mut spans = Vec::new();
            let mut cursor = 0;
            for (gap, len) in gaps {
                let start = cursor + gap;
                spans.push((start, start + len));
                cursor = start + len + 1;
            }
            spans
        })
    }

    proptest! {
        /// Property: with disjoint spans a line resolves exactly to the span holding it.
        #[test]
        fn resolves_iff_line_inside_span(spans in disjoint_spans(), line in 0usize..80) {
            let methods = spans
                .iter()
                .enumerate()
                .map(|(i, &(s, e))| method(&format!("m{}", i), s, e))
                .collect();
            let index = MethodIndex::from_methods(methods);

            let expected = spans.iter().position(|&(s, e)| s <= line && line <= e);
            let actual = index.resolve(line).map(|m| m.key.name.clone());
            prop_assert_eq!(actual, expected.map(|i| format!("m{}", i)));
        }
    }
}
