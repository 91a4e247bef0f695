use mlang_core::{
    token::grammar::{KEYWORDS, NATIVE_FUNCTIONS},
    visitor::{Definition, DefinitionKind},
};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, MarkupContent, MarkupKind, Url};

/// Payload carried by definition items so `completionItem/resolve` can find
/// the definition again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ResolveData {
    pub(crate) uri: Url,
    pub(crate) name: String,
}

static STATIC_ITEMS: Lazy<Vec<CompletionItem>> = Lazy::new(|| {
    let keywords = KEYWORDS.iter().map(|keyword| CompletionItem {
        label: keyword.to_string(),
        kind: Some(CompletionItemKind::KEYWORD),
        detail: Some("keyword".to_string()),
        ..Default::default()
    });
    let natives = NATIVE_FUNCTIONS.iter().map(|name| CompletionItem {
        label: name.to_string(),
        kind: Some(CompletionItemKind::FUNCTION),
        detail: Some("built-in function".to_string()),
        ..Default::default()
    });
    keywords.chain(natives).collect()
});

/// Keywords, built-ins, then one item per distinct name defined in the
/// document.
pub(crate) fn completion_items(uri: &Url, definitions: &[Definition]) -> Vec<CompletionItem> {
    let mut items = STATIC_ITEMS.clone();
    let mut seen = FxHashSet::default();
    for definition in definitions {
        if !seen.insert(definition.name.as_str()) {
            continue;
        }
        let data = ResolveData {
            uri: uri.clone(),
            name: definition.name.clone(),
        };
        items.push(CompletionItem {
            label: definition.name.clone(),
            kind: Some(item_kind(definition.kind)),
            detail: Some(signature(definition)),
            data: serde_json::to_value(data).ok(),
            ..Default::default()
        });
    }
    items
}

fn item_kind(kind: DefinitionKind) -> CompletionItemKind {
    match kind {
        DefinitionKind::Function | DefinitionKind::AnonymousFunction => CompletionItemKind::FUNCTION,
        DefinitionKind::Argument | DefinitionKind::DefaultArgument => CompletionItemKind::VARIABLE,
        DefinitionKind::Variable => CompletionItemKind::VARIABLE,
    }
}

/// `name(a, b = 2)` for functions, the bare name otherwise.
pub(crate) fn signature(definition: &Definition) -> String {
    match definition.kind {
        DefinitionKind::Function => {
            let params: Vec<String> = definition
                .arguments
                .iter()
                .map(|arg| match &arg.content {
                    Some(default) => format!("{} = {}", arg.name, default),
                    None => arg.name.clone(),
                })
                .collect();
            format!("function {}({})", definition.name, params.join(", "))
        }
        DefinitionKind::DefaultArgument => match &definition.content {
            Some(default) => format!("{} = {}", definition.name, default),
            None => definition.name.clone(),
        },
        _ => definition.name.clone(),
    }
}

/// Fill in documentation for a definition item from the first definition
/// found for it.
pub(crate) fn resolve_item(mut item: CompletionItem, definition: Option<&Definition>) -> CompletionItem {
    let Some(definition) = definition else {
        return item;
    };
    item.detail = Some(signature(definition));
    if let Some(doc) = &definition.documentation {
        item.documentation = Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("```matlab\n{}\n```\n\n{}", signature(definition), doc),
        }));
    }
    item
}
