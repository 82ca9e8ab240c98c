//! Parser fidelity on whole files

use nullinate_core::cst::ast::{AstNode, CompilationUnit};
use nullinate_core::cst::parse_csharp;

const SAMPLE: &str = r#"// <copyright file="Sample.cs">
using System;
using System.Collections.Generic;
using JetBrains.Annotations;

#nullable disable

namespace Sample.Services
{
    /// <summary>Lookup helpers</summary>
    [PublicAPI]
    public sealed class Lookup<TKey, TValue> : IDisposable where TKey : notnull
    {
        private readonly Dictionary<TKey, TValue> _items = new();
        public event EventHandler Changed;

        public int Count => _items.Count;

        [CanBeNull]
        public TValue Find([NotNull] TKey key, TValue fallback = default)
        {
            var text = $"{key} -> {{literal}} {(fallback == null ? "none" : "some")}";
            var path = @"C:\temp\""quoted""";
            char c = '\'';
            return _items.TryGetValue(key, out var value) ? value : fallback;
        }

        internal Lookup([CanBeNull] IEnumerable<KeyValuePair<TKey, TValue>> seed = null) : base()
        {
            foreach (var pair in seed ?? Array.Empty<KeyValuePair<TKey, TValue>>())
                _items[pair.Key] = pair.Value;
        }

        public TValue this[[NotNull] TKey key] { get => _items[key]; set => _items[key] = value; }

#if DEBUG
        private static string Dump(object[] values, params string[] names) => string.Join(",", names);
#endif

        public void Dispose() { }
    }
}
"#;

#[test]
fn whole_file_round_trips() {
    let parse = parse_csharp(SAMPLE);
    assert_eq!(parse.syntax().text().to_string(), SAMPLE);
}

#[test]
fn crlf_text_round_trips() {
    let crlf = SAMPLE.replace('\n', "\r\n");
    let parse = parse_csharp(&crlf);
    assert_eq!(parse.syntax().text().to_string(), crlf);
}

#[test]
fn declarations_are_found_in_source_order() {
    let source = "class C {\n    [CanBeNull] public string Foo(int a) => null;\n    C(string s) {}\n    int this[int i] => i;\n}\n";
    let parse = parse_csharp(source);
    assert!(parse.ok(), "parse errors: {:?}", parse.errors());

    let unit = CompilationUnit::cast(parse.syntax()).unwrap();
    let described: Vec<String> = unit.method_likes().map(|m| m.describe()).collect();
    assert_eq!(
        described,
        vec!["method `Foo`", "constructor `C`", "indexer `this[]`"]
    );

    let foo = unit.method_likes().next().unwrap();
    assert!(foo.is_public());
    assert_eq!(foo.attribute_lists().count(), 1);
    let params: Vec<_> = foo.parameter_list().unwrap().parameters().collect();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name().as_deref(), Some("a"));
}
