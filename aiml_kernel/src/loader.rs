//! AIML document parsing.

use roxmltree::{Document, Node};

use crate::category::{Category, Condition, ConditionItem, Template, TemplateNode};
use crate::error::{KernelError, Result};

/// Parse every category of an AIML document.
///
/// `origin` names the document in errors, usually its path.
pub fn parse_document(source: &str, origin: &str) -> Result<Vec<Category>> {
    let doc = Document::parse(source).map_err(|source| KernelError::Xml {
        origin: origin.to_string(),
        source,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "aiml" {
        return Err(KernelError::invalid(
            origin,
            format!("root element is <{}>, expected <aiml>", root.tag_name().name()),
        ));
    }

    let mut categories = Vec::new();
    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "category" => categories.push(parse_category(child, None, origin)?),
            "topic" => {
                let topic = child
                    .attribute("name")
                    .ok_or_else(|| KernelError::invalid(origin, "<topic> without a name attribute"))?;
                for category in child
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "category")
                {
                    categories.push(parse_category(category, Some(topic), origin)?);
                }
            }
            other => tracing::debug!(element = other, origin, "skipping unsupported top-level element"),
        }
    }

    Ok(categories)
}

fn parse_category(node: Node, topic: Option<&str>, origin: &str) -> Result<Category> {
    let mut pattern = None;
    let mut that = None;
    let mut template = None;

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pattern" => pattern = Some(element_text(child)),
            "that" => that = Some(element_text(child)),
            "template" => template = Some(Template::new(parse_children(child))),
            _ => {}
        }
    }

    let pattern = pattern.ok_or_else(|| KernelError::invalid(origin, "<category> without a <pattern>"))?;
    let template = template.ok_or_else(|| {
        KernelError::invalid(origin, format!("category '{}' has no <template>", pattern.trim()))
    })?;

    let mut category = Category::new(&pattern, template);
    if category.is_empty() {
        return Err(KernelError::invalid(origin, "<pattern> is empty"));
    }
    if let Some(that) = that {
        category = category.with_that(&that);
    }
    if let Some(topic) = topic {
        category = category.with_topic(topic);
    }
    Ok(category)
}

/// All text below an element, ignoring markup.
fn element_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn parse_children(node: Node) -> Vec<TemplateNode> {
    let mut nodes = Vec::new();
    for child in node.children() {
        if child.is_element() {
            nodes.push(parse_element(child));
        } else if let Some(text) = child.text().filter(|_| child.is_text()) {
            let text = squeeze(text);
            if !text.is_empty() {
                nodes.push(TemplateNode::Text(text));
            }
        }
    }
    nodes
}

/// Collapse whitespace runs to one space but keep a boundary space, since it
/// separates the text from neighbouring elements.
fn squeeze(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn index_attribute(node: Node) -> usize {
    node.attribute("index")
        .and_then(|i| i.split(',').next())
        .and_then(|i| i.trim().parse().ok())
        .filter(|i| *i > 0)
        .unwrap_or(1)
}

fn name_attribute(node: Node) -> String {
    node.attribute("name").unwrap_or_default().to_string()
}

fn list_items<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == "li")
}

fn parse_element(node: Node) -> TemplateNode {
    match node.tag_name().name() {
        "star" => TemplateNode::Star { index: index_attribute(node) },
        "thatstar" => TemplateNode::ThatStar { index: index_attribute(node) },
        "topicstar" => TemplateNode::TopicStar { index: index_attribute(node) },
        "srai" => TemplateNode::Srai(parse_children(node)),
        "sr" => TemplateNode::Sr,
        "bot" => TemplateNode::Bot { name: name_attribute(node) },
        "get" => TemplateNode::Get { name: name_attribute(node) },
        "set" => TemplateNode::Set {
            name: name_attribute(node),
            children: parse_children(node),
        },
        "think" => TemplateNode::Think(parse_children(node)),
        "random" => TemplateNode::Random(list_items(node).map(parse_children).collect()),
        "condition" => TemplateNode::Condition(parse_condition(node)),
        "uppercase" => TemplateNode::Uppercase(parse_children(node)),
        "lowercase" => TemplateNode::Lowercase(parse_children(node)),
        "formal" => TemplateNode::Formal(parse_children(node)),
        "sentence" => TemplateNode::Sentence(parse_children(node)),
        "input" => TemplateNode::Input { index: index_attribute(node) },
        "that" => TemplateNode::That { index: index_attribute(node) },
        "date" => TemplateNode::Date,
        "size" => TemplateNode::Size,
        "version" => TemplateNode::Version,
        "id" => TemplateNode::Id,
        _ => TemplateNode::Group(parse_children(node)),
    }
}

fn parse_condition(node: Node) -> Condition {
    let name = node.attribute("name").map(str::to_string);

    match (name, node.attribute("value")) {
        (Some(name), Some(value)) => Condition::Block {
            name,
            value: value.to_string(),
            children: parse_children(node),
        },
        (name, _) => Condition::List {
            name,
            items: list_items(node)
                .map(|li| ConditionItem {
                    name: li.attribute("name").map(str::to_string),
                    value: li.attribute("value").map(str::to_string),
                    children: parse_children(li),
                })
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<aiml version="1.0.1">
  <category>
    <pattern>HELLO</pattern>
    <template>Hi   there,
        <get name="name"/>!</template>
  </category>
  <category>
    <pattern>YES</pattern>
    <that>DO YOU LIKE MOVIES</that>
    <template><srai>I LIKE MOVIES</srai></template>
  </category>
  <topic name="TRAVEL">
    <category>
      <pattern>*</pattern>
      <template><random><li>Nice.</li><li>Cool.</li></random></template>
    </category>
  </topic>
</aiml>
"#;

    #[test]
    fn test_parse_sample_document() {
        let categories = parse_document(SAMPLE, "sample.aiml").unwrap();
        assert_eq!(categories.len(), 3);

        assert_eq!(categories[0].pattern, vec!["HELLO"]);
        assert_eq!(
            categories[0].template.nodes,
            vec![
                TemplateNode::Text("Hi there, ".to_string()),
                TemplateNode::Get { name: "name".to_string() },
                TemplateNode::Text("!".to_string()),
            ]
        );

        assert_eq!(categories[1].that, vec!["DO", "YOU", "LIKE", "MOVIES"]);
        assert_eq!(categories[2].topic, vec!["TRAVEL"]);
        assert!(matches!(
            &categories[2].template.nodes[0],
            TemplateNode::Random(items) if items.len() == 2
        ));
    }

    #[test]
    fn test_condition_shapes() {
        let doc = r#"<aiml>
  <category><pattern>A</pattern><template><condition name="mood" value="happy">Yay</condition></template></category>
  <category><pattern>B</pattern><template>
    <condition name="mood"><li value="sad">Aw</li><li>Hm</li></condition>
  </template></category>
</aiml>"#;
        let categories = parse_document(doc, "cond.aiml").unwrap();

        assert!(matches!(
            &categories[0].template.nodes[0],
            TemplateNode::Condition(Condition::Block { name, value, .. }) if name == "mood" && value == "happy"
        ));
        let list = categories[1]
            .template
            .nodes
            .iter()
            .find_map(|n| match n {
                TemplateNode::Condition(Condition::List { items, .. }) => Some(items),
                _ => None,
            })
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].value, None);
    }

    #[test]
    fn test_rejects_wrong_root() {
        let err = parse_document("<html/>", "page.html").unwrap_err();
        assert!(matches!(err, KernelError::InvalidDocument { .. }));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        let err = parse_document("<aiml><category>", "broken.aiml").unwrap_err();
        assert!(matches!(err, KernelError::Xml { .. }));
    }

    #[test]
    fn test_rejects_category_without_template() {
        let err = parse_document(
            "<aiml><category><pattern>HI</pattern></category></aiml>",
            "partial.aiml",
        )
        .unwrap_err();
        assert!(err.to_string().contains("partial.aiml"));
    }
}
