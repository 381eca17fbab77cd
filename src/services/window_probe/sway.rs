use crate::error::Result;
use crate::events::{ForegroundWindow, WindowHandle};
use crate::tracker_error;
use serde_json::Value;
use std::process::Command;

use super::r#trait::WindowProbe;

pub struct SwayProbe;

impl SwayProbe {
    pub fn new() -> Self {
        Self
    }

    fn get_tree() -> Result<String> {
        let output = Command::new("swaymsg")
            .args(["-t", "get_tree"])
            .output()
            .map_err(|e| tracker_error!(probe, "swaymsg не найден: {}", e))?;

        if !output.status.success() {
            return Err(tracker_error!(probe, "swaymsg вернул ошибку"));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Обход дерева в глубину по `nodes` и `floating_nodes`
fn find_focused(node: &Value) -> Option<&Value> {
    if node.get("focused").and_then(Value::as_bool) == Some(true) {
        return Some(node);
    }

    ["nodes", "floating_nodes"]
        .iter()
        .filter_map(|key| node.get(*key).and_then(Value::as_array))
        .flatten()
        .find_map(find_focused)
}

fn parse_tree(json: &str) -> Result<Option<ForegroundWindow>> {
    let tree: Value = serde_json::from_str(json)
        .map_err(|e| tracker_error!(probe, "swaymsg вернул неверный JSON: {}", e))?;

    let Some(node) = find_focused(&tree) else {
        return Ok(None);
    };

    // Фокус на пустом рабочем столе или выходе - окна нет
    match node.get("type").and_then(Value::as_str) {
        Some("con") | Some("floating_con") => {}
        _ => return Ok(None),
    }

    let id = node
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| tracker_error!(probe, "у окна sway нет id"))?;
    let pid = node
        .get("pid")
        .and_then(Value::as_u64)
        .and_then(|pid| u32::try_from(pid).ok())
        .ok_or_else(|| tracker_error!(probe, "у окна sway {} нет pid", id))?;
    let title = node
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Some(ForegroundWindow::new(
        WindowHandle::new(id.to_string()),
        pid,
        title,
    )))
}

impl WindowProbe for SwayProbe {
    fn name(&self) -> &'static str {
        "sway"
    }

    fn test(&self) -> Result<()> {
        Self::get_tree().map(|_| ())
    }

    fn foreground_window(&self) -> Result<Option<ForegroundWindow>> {
        parse_tree(&Self::get_tree()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "id": 1, "type": "root", "focused": false,
        "nodes": [{
            "id": 3, "type": "output", "focused": false,
            "nodes": [{
                "id": 4, "type": "workspace", "focused": false,
                "nodes": [
                    {"id": 7, "type": "con", "focused": false, "pid": 100, "name": "Terminal"}
                ],
                "floating_nodes": [
                    {"id": 9, "type": "floating_con", "focused": true, "pid": 200, "name": "Browser"}
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_finds_focused_floating_window() {
        let window = parse_tree(TREE).unwrap().unwrap();

        assert_eq!(window.handle.as_str(), "9");
        assert_eq!(window.process_id, 200);
        assert_eq!(window.title, "Browser");
    }

    #[test]
    fn test_focused_workspace_is_no_window() {
        let tree = r#"{"id": 1, "type": "root", "nodes": [
            {"id": 4, "type": "workspace", "focused": true, "nodes": []}
        ]}"#;

        assert!(parse_tree(tree).unwrap().is_none());
    }

    #[test]
    fn test_null_title_is_empty() {
        let tree = r#"{"id": 1, "type": "root", "nodes": [
            {"id": 5, "type": "con", "focused": true, "pid": 42, "name": null}
        ]}"#;

        let window = parse_tree(tree).unwrap().unwrap();
        assert_eq!(window.title, "");
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_tree("not json").is_err());
    }
}
