// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pattern matching.

use std::collections::HashMap;

use rill_ast::expr::{Pattern, PatternKind};

use crate::value::Value;

use super::Interpreter;

impl Interpreter {
    /// Try to match `value` against `pattern`; `Some` carries the payload
    /// bindings. `top` is true for an arm's outermost pattern, where a bare
    /// name always means a variant; in payload position a bare name binds
    /// unless it names a known variant of the current module.
    pub(super) fn match_pattern(
        &self,
        pattern: &Pattern,
        value: &Value,
        top: bool,
    ) -> Option<HashMap<String, Value>> {
        match &pattern.kind {
            PatternKind::Wildcard => Some(HashMap::new()),

            PatternKind::Int(n) => match value {
                Value::Int(v) if v == n => Some(HashMap::new()),
                _ => None,
            },

            PatternKind::Str(s) => match value {
                Value::Str(v) if v.as_ref() == s => Some(HashMap::new()),
                _ => None,
            },

            PatternKind::Bool(b) => match value {
                Value::Bool(v) if v == b => Some(HashMap::new()),
                _ => None,
            },

            PatternKind::Name {
                qualifier,
                name,
                args,
            } => {
                let resolved = match qualifier {
                    Some(alias) => self.modules[self.current_module]
                        .imports
                        .get(alias)
                        .copied()
                        .and_then(|t| self.modules[t].variants.get(name).map(|v| (t, *v))),
                    None => self.modules[self.current_module]
                        .variants
                        .get(name)
                        .map(|v| (self.current_module, *v)),
                };

                let Some((module, vref)) = resolved else {
                    // Not a known variant: a bare payload name binds.
                    if qualifier.is_none() && args.is_none() && !top {
                        let mut bindings = HashMap::new();
                        bindings.insert(name.clone(), value.clone());
                        return Some(bindings);
                    }
                    return None;
                };

                let Value::Enum {
                    enum_name,
                    variant,
                    fields,
                } = value
                else {
                    return None;
                };

                let decl = &self.modules[module].enums[vref.enum_idx].variants[vref.variant_idx];
                if self.modules[module].qualified_enums[vref.enum_idx].as_ref()
                    != enum_name.as_ref()
                    || decl.name != variant.as_ref()
                {
                    return None;
                }

                let args = args.as_deref().unwrap_or(&[]);
                if args.len() != fields.len() {
                    return None;
                }
                let mut bindings = HashMap::new();
                for (sub, field) in args.iter().zip(fields.iter()) {
                    let sub_bindings = self.match_pattern(sub, field, false)?;
                    bindings.extend(sub_bindings);
                }
                Some(bindings)
            }
        }
    }
}
