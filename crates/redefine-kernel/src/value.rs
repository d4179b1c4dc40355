//! Dynamic values passed between factories.
//!
//! Factories exchange exports whose types the kernel never knows. A
//! [`Value`] erases the concrete type behind a shared pointer so the same
//! exports can be cached, handed to several dependents, and compared by
//! identity.

use serde_json::Map;
use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

type Render = fn(&dyn Any) -> String;

/// A shared, type-erased value.
///
/// Cloning a `Value` shares the underlying allocation; use [`Value::same`]
/// to test identity.
#[derive(Clone)]
pub struct Value {
    inner: Rc<dyn Any>,
    type_name: &'static str,
    render: Option<Render>,
}

impl Value {
    /// Wrap any `'static` value.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            type_name: std::any::type_name::<T>(),
            render: None,
        }
    }

    /// Wrap a value whose `Display` output becomes its string coercion.
    pub fn displayable<T: Any + fmt::Display>(value: T) -> Self {
        Self {
            render: Some(render_as::<T>),
            ..Self::new(value)
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::displayable(value.into())
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::displayable(value)
    }

    /// A fresh, empty exports object.
    pub fn exports_object() -> Self {
        Self::new(ExportsObject::default())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the value as a string slice, if it holds one.
    pub fn as_str(&self) -> Option<&str> {
        if let Some(s) = self.downcast_ref::<String>() {
            return Some(s.as_str());
        }
        if let Some(s) = self.downcast_ref::<&'static str>() {
            return Some(*s);
        }
        match self.downcast_ref::<serde_json::Value>() {
            Some(serde_json::Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_exports(&self) -> Option<&ExportsObject> {
        self.downcast_ref::<ExportsObject>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both values share the same allocation.
    pub fn same(&self, other: &Value) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.inner), Rc::as_ptr(&other.inner))
    }

    /// Best-effort JSON projection used for reports.
    ///
    /// Values with no JSON shape project to their string coercion, as does
    /// an exports object reached again through its own members.
    pub fn to_json(&self) -> serde_json::Value {
        self.project(&mut Vec::new())
    }

    fn project(&self, ancestors: &mut Vec<Value>) -> serde_json::Value {
        if let Some(json) = self.downcast_ref::<serde_json::Value>() {
            return json.clone();
        }
        if let Some(s) = self.as_str() {
            return serde_json::Value::String(s.to_string());
        }
        if let Some(exports) = self.as_exports() {
            if ancestors.iter().any(|ancestor| ancestor.same(self)) {
                return serde_json::Value::String(self.to_string());
            }
            ancestors.push(self.clone());
            let members: Vec<(String, Value)> = exports
                .members
                .borrow()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            let members: Map<String, serde_json::Value> = members
                .into_iter()
                .map(|(key, value)| (key, value.project(ancestors)))
                .collect();
            ancestors.pop();
            return serde_json::Value::Object(members);
        }
        serde_json::Value::String(self.to_string())
    }
}

/// Display output of the std scalar types, which coerce like displayable
/// values even when wrapped with [`Value::new`].
fn render_scalar(value: &dyn Any) -> Option<String> {
    macro_rules! scalars {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(v.to_string());
                }
            )*
        };
    }
    scalars!(
        i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    );
    None
}

fn render_as<T: Any + fmt::Display>(value: &dyn Any) -> String {
    value
        .downcast_ref::<T>()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// String coercion, as applied when a value is used as a binding name.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.as_str() {
            return f.write_str(s);
        }
        if let Some(render) = self.render {
            return f.write_str(&render(&*self.inner));
        }
        if let Some(scalar) = render_scalar(&*self.inner) {
            return f.write_str(&scalar);
        }
        if self.is::<ExportsObject>() {
            return f.write_str("[object Exports]");
        }
        write!(f, "[object {}]", self.type_name)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name)
            .field("display", &self.to_string())
            .finish()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::json(value)
    }
}

/// The mutable exports slot handed to factories via the `exports` sentinel.
///
/// Members written through a shared handle are visible to every holder of
/// the same [`Value`].
#[derive(Debug, Default)]
pub struct ExportsObject {
    members: RefCell<BTreeMap<String, Value>>,
}

impl ExportsObject {
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.members.borrow_mut().insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.members.borrow().get(key).cloned()
    }
}
