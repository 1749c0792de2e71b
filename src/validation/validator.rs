//! 请求参数校验
//!
//! - `validate_single`：按 Schema 校验一个对象，收集全部字段错误、丢弃未声明字段、填充默认值
//! - `RequestValidator`：对 body / params / query 各自校验，所有分段都会执行，全部通过才放行
//! - `validate_param`：单独校验一个路径参数

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumIter};
use tracing::{debug, warn};

use super::schema::{Field, FieldKind, Schema};
use crate::utils::{Period, PeriodKind};

/// 校验失败时的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

impl ErrorBody {
    fn from_details(mut details: Vec<FieldError>) -> Self {
        // 按字段路径排序，sort_by 是稳定排序
        details.sort_by(|a, b| a.path.cmp(&b.path));
        let joined = details
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            status: 400,
            message: format!("Invalid parameter value: {}.", joined),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldError {
    path: String,
    message: String,
}

/// 校验上下文
///
/// `today` 用于把命名周期（如 `month`）换算成具体锚点日期。
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn now() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }

    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }
}

/// 按 Schema 校验单个对象
///
/// 成功返回转换、填充默认值并去除未知字段后的对象；
/// 失败返回 `{status: 400, message}`，message 包含所有字段错误。
/// `None` / `null` 视为空对象。
pub fn validate_single(
    schema: &Schema,
    value: Option<&Value>,
    ctx: &ValidationContext,
) -> Result<Map<String, Value>, ErrorBody> {
    let empty = Map::new();
    let input = match value {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ErrorBody::from_details(vec![FieldError {
                path: "value".to_string(),
                message: "`value` must be of type object".to_string(),
            }]));
        }
    };

    let mut output = Map::new();
    let mut errors = Vec::new();

    for (name, field) in schema.fields() {
        match input.get(name) {
            Some(raw) => match coerce(name, field, raw, ctx) {
                Ok(v) => {
                    output.insert(name.to_string(), v);
                }
                Err(message) => errors.push(FieldError {
                    path: name.to_string(),
                    message,
                }),
            },
            None if field.is_required() => errors.push(FieldError {
                path: name.to_string(),
                message: format!("`{}` is required", name),
            }),
            None => {
                // 默认值同样经过类型转换，例如 `month` 会展开为周期对象
                if let Some(default) = field.default() {
                    match coerce(name, field, &default.resolve(), ctx) {
                        Ok(value) => {
                            output.insert(name.to_string(), value);
                        }
                        // 默认值不合法属于 Schema 配置错误，不写入输出
                        Err(message) => warn!("Invalid default for `{}`: {}", name, message),
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(ErrorBody::from_details(errors))
    }
}

/// 单独校验一个路径参数
pub fn validate_param(
    name: &str,
    field: &Field,
    value: &str,
    ctx: &ValidationContext,
) -> Result<Value, ErrorBody> {
    coerce(name, field, &Value::String(value.to_string()), ctx).map_err(|message| {
        ErrorBody::from_details(vec![FieldError {
            path: name.to_string(),
            message,
        }])
    })
}

/// 转换并校验单个字段值，返回字段错误消息
fn coerce(
    name: &str,
    field: &Field,
    raw: &Value,
    ctx: &ValidationContext,
) -> Result<Value, String> {
    match field.kind() {
        FieldKind::String {
            min_len,
            max_len,
            uppercase,
        } => {
            let s = raw
                .as_str()
                .ok_or_else(|| format!("`{}` must be a string", name))?;
            let s = if *uppercase {
                s.to_uppercase()
            } else {
                s.to_string()
            };
            let len = s.chars().count();
            if let Some(min) = min_len
                && len < *min
            {
                return Err(format!(
                    "`{}` length must be at least {} characters long",
                    name, min
                ));
            }
            if let Some(max) = max_len
                && len > *max
            {
                return Err(format!(
                    "`{}` length must be less than or equal to {} characters long",
                    name, max
                ));
            }
            Ok(Value::String(s))
        }
        FieldKind::Integer { min, max } => {
            let n = parse_integer(raw).map_err(|e| format!("`{}` {}", name, e))?;
            if let Some(min) = min
                && n < *min
            {
                return Err(format!(
                    "`{}` must be greater than or equal to {}",
                    name, min
                ));
            }
            if let Some(max) = max
                && n > *max
            {
                return Err(format!("`{}` must be less than or equal to {}", name, max));
            }
            Ok(Value::from(n))
        }
        FieldKind::Boolean => match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(format!("`{}` must be a boolean", name)),
        },
        FieldKind::OneOf(options) => match raw.as_str() {
            Some(s) if options.iter().any(|o| o == s) => Ok(Value::String(s.to_string())),
            _ => Err(format!("`{}` must be one of [{}]", name, options.join(", "))),
        },
        FieldKind::Date => raw
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| format!("`{}` must be a valid date", name)),
        FieldKind::Period => {
            let period = match raw {
                Value::String(s) => Period::parse(s, ctx.today),
                Value::Object(_) => serde_json::from_value::<Period>(raw.clone()).ok(),
                _ => None,
            };
            period
                .and_then(|p| serde_json::to_value(p).ok())
                .ok_or_else(|| period_error(name))
        }
    }
}

fn parse_integer(raw: &Value) -> Result<i64, &'static str> {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|_| !s.trim().is_empty()),
        _ => None,
    }
    .filter(|f| f.is_finite())
    .ok_or("must be a number")?;

    if number.fract() != 0.0 {
        return Err("must be an integer");
    }
    if number < i64::MIN as f64 || number > i64::MAX as f64 {
        return Err("must be a safe number");
    }
    Ok(number as i64)
}

fn period_error(name: &str) -> String {
    let names: Vec<&str> = PeriodKind::NAMED.iter().map(|k| k.as_ref()).collect();
    format!(
        "`{}` must be one of [{}] or a valid YYYY-MM / YYYY value",
        name,
        names.join(", ")
    )
}

// ============ 分段校验 ============

/// 请求分段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Body,
    Params,
    Query,
}

/// 原始请求各分段（已由路由解析，未校验）
#[derive(Debug, Clone, Default)]
pub struct RawSections {
    pub body: Option<Value>,
    pub params: Option<Value>,
    pub query: Option<Value>,
}

impl RawSections {
    pub fn get(&self, section: Section) -> Option<&Value> {
        match section {
            Section::Body => self.body.as_ref(),
            Section::Params => self.params.as_ref(),
            Section::Query => self.query.as_ref(),
        }
    }
}

/// 校验后的各分段；校验失败或未声明的分段为空对象
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedSections {
    pub body: Map<String, Value>,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
}

impl ValidatedSections {
    fn slot(&mut self, section: Section) -> &mut Map<String, Value> {
        match section {
            Section::Body => &mut self.body,
            Section::Params => &mut self.params,
            Section::Query => &mut self.query,
        }
    }
}

/// 分段校验结果
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub sections: ValidatedSections,
    /// 最后一个失败分段的错误（各分段错误不合并）
    pub error: Option<ErrorBody>,
    valid: bool,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// 请求校验器
///
/// 固定持有已声明的 `(section, schema)` 列表（顺序 body, params, query）。
/// 每次校验都会执行全部分段，即使前面的分段已经失败，
/// 保证 `ValidatedSections` 总是完整填充。
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    validations: Vec<(Section, Schema)>,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(self, schema: Schema) -> Self {
        self.with(Section::Body, schema)
    }

    pub fn params(self, schema: Schema) -> Self {
        self.with(Section::Params, schema)
    }

    pub fn query(self, schema: Schema) -> Self {
        self.with(Section::Query, schema)
    }

    fn with(mut self, section: Section, schema: Schema) -> Self {
        self.validations.retain(|(s, _)| *s != section);
        self.validations.push((section, schema));
        self.validations.sort_by_key(|(s, _)| *s as u8);
        self
    }

    pub fn validate(&self, raw: &RawSections, ctx: &ValidationContext) -> ValidationOutcome {
        let mut sections = ValidatedSections::default();
        let mut error = None;
        let mut valid = true;

        for (section, schema) in &self.validations {
            match validate_single(schema, raw.get(*section), ctx) {
                Ok(value) => *sections.slot(*section) = value,
                Err(body) => {
                    debug!(
                        "Validation failed for section '{}': {}",
                        section.as_ref(),
                        body.message
                    );
                    *sections.slot(*section) = Map::new();
                    error = Some(body);
                    valid = false;
                }
            }
        }

        ValidationOutcome {
            sections,
            error,
            valid,
        }
    }

    pub fn schema(&self, section: Section) -> Option<&Schema> {
        self.validations
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, schema)| schema)
    }

    /// 分段声明的字段名；未声明的分段返回 `None`
    pub fn schema_keys(&self, section: Section) -> Option<Vec<&str>> {
        self.schema(section).map(Schema::keys)
    }

    pub fn required_schema_keys(&self, section: Section) -> Option<Vec<&str>> {
        self.schema(section).map(Schema::required_keys)
    }

    pub fn schema_defaults(&self, section: Section) -> Option<BTreeMap<String, String>> {
        self.schema(section).map(Schema::defaults)
    }
}
