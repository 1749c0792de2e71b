//! 请求参数 Schema 定义
//!
//! Schema 是一等值：既驱动校验，也直接提供元信息（字段列表、必填字段、默认值），
//! 不依赖任何校验库的内部结构。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// 默认值生成函数
pub type DefaultGenerator = Arc<dyn Fn() -> Value + Send + Sync>;

/// 字段默认值：固定值或生成函数
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Generator(DefaultGenerator),
}

impl DefaultValue {
    /// 解析出实际默认值（生成函数每次调用都会重新求值）
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Generator(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// 字段类型约束
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String {
        min_len: Option<usize>,
        max_len: Option<usize>,
        /// 校验前转换为大写
        uppercase: bool,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Boolean,
    /// 枚举字符串
    OneOf(Vec<String>),
    /// `YYYY-MM-DD`
    Date,
    /// 周期：`day|week|month|year|all|YYYY-MM|YYYY` 或 `{period, date}` 对象
    Period,
}

/// 单个字段的声明
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
    pub(crate) default: Option<DefaultValue>,
}

impl Field {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String {
            min_len: None,
            max_len: None,
            uppercase: false,
        })
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer {
            min: None,
            max: None,
        })
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(FieldKind::OneOf(values.into_iter().map(Into::into).collect()))
    }

    pub fn date() -> Self {
        Self::of(FieldKind::Date)
    }

    pub fn period() -> Self {
        Self::of(FieldKind::Period)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Generator(Arc::new(generator)));
        self
    }

    pub fn min_len(mut self, n: usize) -> Self {
        if let FieldKind::String { min_len, .. } = &mut self.kind {
            *min_len = Some(n);
        }
        self
    }

    pub fn max_len(mut self, n: usize) -> Self {
        if let FieldKind::String { max_len, .. } = &mut self.kind {
            *max_len = Some(n);
        }
        self
    }

    /// 将输入转换为大写（例如国家代码）
    pub fn uppercase(mut self) -> Self {
        if let FieldKind::String { uppercase, .. } = &mut self.kind {
            *uppercase = true;
        }
        self
    }

    pub fn min(mut self, n: i64) -> Self {
        if let FieldKind::Integer { min, .. } = &mut self.kind {
            *min = Some(n);
        }
        self
    }

    pub fn max(mut self, n: i64) -> Self {
        if let FieldKind::Integer { max, .. } = &mut self.kind {
            *max = Some(n);
        }
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }
}

/// 对象 Schema：按声明顺序保存字段
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, Field)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明字段；重复声明同名字段会覆盖之前的定义
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// 所有声明的字段名
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// 必填字段名
    pub fn required_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.required)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// 字段名 → 默认值字符串（生成函数会被调用）
    ///
    /// 没有默认值的字段不出现在结果中。
    pub fn defaults(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(n, f)| {
                f.default
                    .as_ref()
                    .map(|d| (n.clone(), stringify_value(&d.resolve())))
            })
            .collect()
    }
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
