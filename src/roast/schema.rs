//! 応答スキーマの宣言と検証
//!
//! # 責務
//!
//! - 解析サービスへ応答形状の制約として渡す JSON Schema を生成
//! - 返ってきた JSON オブジェクトが必須キーと型・値域を満たすか検証
//!
//! スキーマ生成と検証は同じフィールド表（`TOP_LEVEL_FIELDS`, `CATEGORY_FIELDS`）
//! から導出されるため、両者がずれることはありません。
//!
//! # スキーマ
//!
//! ```text
//! overall_score: integer 1..100
//! roast_headline: string
//! main_roast: string
//! categories.formatting:      { score: 1..10, roast: string, issues: string[] }
//! categories.buzzwords:       { score: 1..10, roast: string, offenders: string[] }
//! categories.accomplishments: { score: 1..10, roast: string, feedback: string }
//! categories.red_flags:       { score: 1..10, roast: string, flags: string[] }
//! improvement_tips: string[]
//! career_suggestions: string[]
//! final_verdict: string
//! ```

use serde_json::{Map, Value, json};

/// 総合スコアの値域
pub const OVERALL_SCORE_RANGE: (u8, u8) = (1, 100);

/// カテゴリスコアの値域
pub const CATEGORY_SCORE_RANGE: (u8, u8) = (1, 10);

/// フィールドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    /// 整数スコア（両端を含む値域）
    Score(u8, u8),
    /// 文字列
    Text,
    /// 文字列の配列
    TextList,
}

/// トップレベルのフィールド（`categories` を除く）
const TOP_LEVEL_FIELDS: &[(&str, FieldKind)] = &[
    ("overall_score", FieldKind::Score(OVERALL_SCORE_RANGE.0, OVERALL_SCORE_RANGE.1)),
    ("roast_headline", FieldKind::Text),
    ("main_roast", FieldKind::Text),
    ("improvement_tips", FieldKind::TextList),
    ("career_suggestions", FieldKind::TextList),
    ("final_verdict", FieldKind::Text),
];

/// カテゴリ名と、カテゴリ固有の詳細フィールド
const CATEGORY_FIELDS: &[(&str, &str, FieldKind)] = &[
    ("formatting", "issues", FieldKind::TextList),
    ("buzzwords", "offenders", FieldKind::TextList),
    ("accomplishments", "feedback", FieldKind::Text),
    ("red_flags", "flags", FieldKind::TextList),
];

/// 応答 JSON Schema を生成
///
/// 全フィールドを `required` として宣言します。
pub fn response_schema() -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, kind) in TOP_LEVEL_FIELDS {
        properties.insert(name.to_string(), field_schema(*kind));
        required.push(Value::from(*name));
    }

    let mut category_properties = Map::new();
    for (category, detail, detail_kind) in CATEGORY_FIELDS {
        let mut fields = Map::new();
        fields.insert(
            "score".to_string(),
            field_schema(FieldKind::Score(CATEGORY_SCORE_RANGE.0, CATEGORY_SCORE_RANGE.1)),
        );
        fields.insert("roast".to_string(), field_schema(FieldKind::Text));
        fields.insert(detail.to_string(), field_schema(*detail_kind));

        category_properties.insert(
            category.to_string(),
            json!({
                "type": "object",
                "properties": fields,
                "required": ["score", "roast", *detail],
            }),
        );
    }
    let category_names: Vec<&str> = CATEGORY_FIELDS.iter().map(|(name, _, _)| *name).collect();

    properties.insert(
        "categories".to_string(),
        json!({
            "type": "object",
            "properties": category_properties,
            "required": category_names,
        }),
    );
    required.push(Value::from("categories"));

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn field_schema(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Score(min, max) => json!({ "type": "integer", "minimum": min, "maximum": max }),
        FieldKind::Text => json!({ "type": "string" }),
        FieldKind::TextList => json!({ "type": "array", "items": { "type": "string" } }),
    }
}

/// 応答を検証し、問題点をすべて列挙する
///
/// # 戻り値
///
/// - `Ok(())`: 必須キーがすべて揃い、型と値域が正しい
/// - `Err(Vec<String>)`: 問題のあるフィールドのパスと理由
///
/// # 例
///
/// ```rust
/// use resume_roaster::roast::schema::validate_response;
///
/// let problems = validate_response(&serde_json::json!({})).unwrap_err();
/// assert!(problems.iter().any(|p| p.starts_with("overall_score")));
/// ```
pub fn validate_response(value: &Value) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    let Some(root) = value.as_object() else {
        return Err(vec!["<root>: オブジェクトではありません".to_string()]);
    };

    for (name, kind) in TOP_LEVEL_FIELDS {
        check_field(root, name, *kind, name, &mut problems);
    }

    match root.get("categories") {
        None => problems.push("categories: 必須キーがありません".to_string()),
        Some(Value::Object(categories)) => {
            for (category, detail, detail_kind) in CATEGORY_FIELDS {
                match categories.get(*category) {
                    None => problems.push(format!("categories.{}: 必須キーがありません", category)),
                    Some(Value::Object(fields)) => {
                        let prefix = format!("categories.{}", category);
                        check_field(
                            fields,
                            "score",
                            FieldKind::Score(CATEGORY_SCORE_RANGE.0, CATEGORY_SCORE_RANGE.1),
                            &format!("{}.score", prefix),
                            &mut problems,
                        );
                        check_field(fields, "roast", FieldKind::Text, &format!("{}.roast", prefix), &mut problems);
                        check_field(fields, detail, *detail_kind, &format!("{}.{}", prefix, detail), &mut problems);
                    }
                    Some(_) => problems.push(format!("categories.{}: オブジェクトではありません", category)),
                }
            }
        }
        Some(_) => problems.push("categories: オブジェクトではありません".to_string()),
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn check_field(
    object: &Map<String, Value>,
    key: &str,
    kind: FieldKind,
    path: &str,
    problems: &mut Vec<String>,
) {
    let Some(value) = object.get(key) else {
        problems.push(format!("{}: 必須キーがありません", path));
        return;
    };

    match kind {
        FieldKind::Score(min, max) => match value.as_f64() {
            Some(score) if score.fract() != 0.0 => {
                problems.push(format!("{}: 整数ではありません ({})", path, score));
            }
            Some(score) if score < f64::from(min) || score > f64::from(max) => {
                problems.push(format!("{}: 値域 {}..={} の外です ({})", path, min, max, score));
            }
            Some(_) => {}
            None => problems.push(format!("{}: 数値ではありません", path)),
        },
        FieldKind::Text => {
            if !value.is_string() {
                problems.push(format!("{}: 文字列ではありません", path));
            }
        }
        FieldKind::TextList => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => {}
            Some(_) => problems.push(format!("{}: 文字列以外の要素が含まれています", path)),
            None => problems.push(format!("{}: 配列ではありません", path)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_response() -> Value {
        json!({
            "overall_score": 42,
            "roast_headline": "A resume that whispers when it should shout",
            "main_roast": "Para one.\n\nPara two.",
            "categories": {
                "formatting": { "score": 6, "roast": "Fine.", "issues": ["Two fonts"] },
                "buzzwords": { "score": 3, "roast": "Synergy!", "offenders": ["synergy"] },
                "accomplishments": { "score": 2, "roast": "Where are the numbers?", "feedback": "Quantify." },
                "red_flags": { "score": 5, "roast": "Hmm.", "flags": [] }
            },
            "improvement_tips": ["a", "b", "c", "d", "e"],
            "career_suggestions": ["x", "y", "z"],
            "final_verdict": "There is hope."
        })
    }

    #[test]
    fn test_valid_response_passes() {
        assert_eq!(validate_response(&valid_response()), Ok(()));
    }

    #[test]
    fn test_missing_overall_score() {
        let mut response = valid_response();
        response.as_object_mut().unwrap().remove("overall_score");

        let problems = validate_response(&response).unwrap_err();
        assert_eq!(problems, vec!["overall_score: 必須キーがありません".to_string()]);
    }

    #[test]
    fn test_missing_nested_category_key() {
        let mut response = valid_response();
        response["categories"]["buzzwords"]
            .as_object_mut()
            .unwrap()
            .remove("offenders");
        response["categories"].as_object_mut().unwrap().remove("red_flags");

        let problems = validate_response(&response).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems.contains(&"categories.buzzwords.offenders: 必須キーがありません".to_string()));
        assert!(problems.contains(&"categories.red_flags: 必須キーがありません".to_string()));
    }

    #[test]
    fn test_score_out_of_range() {
        let mut response = valid_response();
        response["overall_score"] = json!(150);
        response["categories"]["formatting"]["score"] = json!(0);

        let problems = validate_response(&response).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("overall_score"));
        assert!(problems[1].starts_with("categories.formatting.score"));
    }

    #[test]
    fn test_integral_float_score_is_accepted() {
        let mut response = valid_response();
        response["overall_score"] = json!(42.0);
        assert_eq!(validate_response(&response), Ok(()));

        response["overall_score"] = json!(42.5);
        assert!(validate_response(&response).is_err());
    }

    #[test]
    fn test_wrong_types() {
        let mut response = valid_response();
        response["roast_headline"] = json!(7);
        response["improvement_tips"] = json!("just one tip");
        response["career_suggestions"] = json!(["ok", 3]);

        let problems = validate_response(&response).unwrap_err();
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn test_list_lengths_are_not_enforced() {
        let mut response = valid_response();
        response["improvement_tips"] = json!(["only one"]);
        response["career_suggestions"] = json!([]);
        assert_eq!(validate_response(&response), Ok(()));
    }

    #[test]
    fn test_non_object_root() {
        assert!(validate_response(&json!([1, 2, 3])).is_err());
        assert!(validate_response(&json!("text")).is_err());
    }

    #[test]
    fn test_schema_declares_every_field_required() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();

        for (name, _) in TOP_LEVEL_FIELDS {
            assert!(required.contains(name));
        }
        assert!(required.contains(&"categories"));

        assert_eq!(schema["properties"]["overall_score"]["type"], "integer");
        assert_eq!(schema["properties"]["overall_score"]["maximum"], 100);
        assert_eq!(
            schema["properties"]["categories"]["properties"]["accomplishments"]["properties"]["feedback"]["type"],
            "string"
        );
        assert_eq!(
            schema["properties"]["categories"]["properties"]["red_flags"]["required"],
            json!(["score", "roast", "flags"])
        );
    }
}
