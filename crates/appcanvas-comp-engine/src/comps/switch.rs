//! The switch (toggle) widget.
//!
//! Exercises the whole framework surface: a boolean exposing state, label
//! and style slots, an event set (`change` plus `true`/`false` for
//! open/close), a migrated legacy style payload, ref-bound imperative
//! methods, and the common exposed flags.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::builder::{ref_methods, CompBuilder, HasViewRef, RefMethod};
use crate::children::ChildrenComposition;
use crate::controls::style::token_sets::{
    ANIMATION_STYLE, INPUT_FIELD_STYLE, LABEL_STYLE, SWITCH_STYLE,
};
use crate::controls::{
    BoolCodeControl, BoolStateControl, Control, EventDef, EventHandlerControl, LabelControl,
    LabelView, RefControl, StyleControl,
};
use crate::errors::BuildError;
use crate::exposing::{
    common_exposed_configs, with_exposing, CommonChildren, ExposedCompDef, ExposedValueConfig,
};
use crate::instance::WidgetInstance;
use crate::migration::{Migrated, MigrationChain, MigrationEntry};
use crate::property_view::Section;

pub const CHANGE_EVENT: EventDef = EventDef {
    value: "change",
    label_key: "event.change",
    description_key: "event.changeDesc",
};

pub const OPEN_EVENT: EventDef = EventDef {
    value: "true",
    label_key: "switch.open",
    description_key: "switch.openDesc",
};

pub const CLOSE_EVENT: EventDef = EventDef {
    value: "false",
    label_key: "switch.close",
    description_key: "switch.closeDesc",
};

const EVENT_OPTIONS: &[EventDef] = &[CHANGE_EVENT, OPEN_EVENT, CLOSE_EVENT];

/// The switch's children record. Names are fixed here; this is the
/// widget's whole configuration surface.
#[derive(Clone)]
pub struct SwitchChildren {
    pub value: BoolStateControl,
    pub label: LabelControl,
    pub on_event: EventHandlerControl,
    pub disabled: BoolCodeControl,
    pub hidden: BoolCodeControl,
    pub style: StyleControl,
    pub label_style: StyleControl,
    pub input_field_style: Migrated<StyleControl>,
    pub animation_style: StyleControl,
    pub view_ref: RefControl,
}

impl Default for SwitchChildren {
    fn default() -> Self {
        Self {
            value: BoolStateControl::new(false),
            label: LabelControl::new("Switch"),
            on_event: EventHandlerControl::new(EVENT_OPTIONS),
            disabled: BoolCodeControl::new(),
            hidden: BoolCodeControl::new(),
            style: StyleControl::new(INPUT_FIELD_STYLE),
            label_style: StyleControl::new(LABEL_STYLE)
                .filter(|t| !["accent", "validate"].contains(&t.name)),
            input_field_style: Migrated::new(
                switch_style_migrations(),
                StyleControl::new(SWITCH_STYLE),
            ),
            animation_style: StyleControl::new(ANIMATION_STYLE),
            view_ref: RefControl::new(),
        }
    }
}

impl ChildrenComposition for SwitchChildren {
    fn visit(&self, f: &mut dyn FnMut(&str, &dyn Control)) {
        f("value", &self.value);
        f("label", &self.label);
        f("onEvent", &self.on_event);
        f("disabled", &self.disabled);
        f("hidden", &self.hidden);
        f("style", &self.style);
        f("labelStyle", &self.label_style);
        f("inputFieldStyle", &self.input_field_style);
        f("animationStyle", &self.animation_style);
        f("viewRef", &self.view_ref);
    }

    fn visit_mut(&mut self, f: &mut dyn FnMut(&str, &mut dyn Control)) {
        f("value", &mut self.value);
        f("label", &mut self.label);
        f("onEvent", &mut self.on_event);
        f("disabled", &mut self.disabled);
        f("hidden", &mut self.hidden);
        f("style", &mut self.style);
        f("labelStyle", &mut self.label_style);
        f("inputFieldStyle", &mut self.input_field_style);
        f("animationStyle", &mut self.animation_style);
        f("viewRef", &mut self.view_ref);
    }
}

impl CommonChildren for SwitchChildren {
    fn disabled(&self) -> &BoolCodeControl {
        &self.disabled
    }

    fn hidden(&self) -> &BoolCodeControl {
        &self.hidden
    }
}

impl HasViewRef for SwitchChildren {
    fn view_ref(&self) -> &RefControl {
        &self.view_ref
    }
}

/// Render projection consumed by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchView {
    pub checked: bool,
    pub disabled: bool,
    pub label: LabelView,
    pub style: BTreeMap<String, String>,
    pub label_style: BTreeMap<String, String>,
    pub input_field_style: BTreeMap<String, String>,
    pub animation_style: BTreeMap<String, String>,
}

/// Legacy payloads (saved before the track-color rename) carry an
/// `unChecked` key.
#[derive(serde::Deserialize)]
struct LegacySwitchStyle {
    #[serde(rename = "unChecked")]
    un_checked: String,
    checked: Option<String>,
    handle: Option<String>,
    label: Option<String>,
}

fn switch_style_migrations() -> MigrationChain {
    MigrationChain::new().entry(MigrationEntry::when(
        |raw| raw.get("unChecked").is_some(),
        |raw| match serde_json::from_value::<LegacySwitchStyle>(raw.clone()) {
            Ok(legacy) => {
                let mut map = serde_json::Map::new();
                map.insert("unchecked".into(), Value::String(legacy.un_checked));
                if let Some(v) = legacy.checked {
                    map.insert("checked".into(), Value::String(v));
                }
                if let Some(v) = legacy.handle {
                    map.insert("handle".into(), Value::String(v));
                }
                if let Some(v) = legacy.label {
                    map.insert("label".into(), Value::String(v));
                }
                Value::Object(map)
            }
            Err(_) => raw,
        },
    ))
}

/// Build the switch widget definition.
pub fn switch_definition() -> Result<Arc<ExposedCompDef<SwitchChildren, SwitchView>>, BuildError> {
    let def = CompBuilder::new("switch", SwitchChildren::default(), |c, _dispatch| {
        SwitchView {
            checked: c.value.value(),
            disabled: c.disabled.value(),
            label: c.label.view(),
            style: c.style.resolved(),
            label_style: c.label_style.resolved(),
            input_field_style: c.input_field_style.inner().resolved(),
            animation_style: c.animation_style.resolved(),
        }
    })
    .label("Switch")
    .category("forms")
    .set_property_view_fn(|c, ctx| {
        let mut sections = vec![Section::new(
            ctx.trans("section.basic"),
            c.value
                .property_item(ctx, &ctx.trans("switch.defaultValue"))
                .into_iter()
                .collect(),
        )];

        if ctx.mode.shows_logic() {
            let mut items = Vec::new();
            items.extend(c.on_event.property_item(ctx, &ctx.trans("event.handlers")));
            items.extend(c.disabled.property_item(ctx, &ctx.trans("comp.disabled")));
            items.extend(c.hidden.property_item(ctx, &ctx.trans("comp.hidden")));
            sections.push(Section::new(ctx.trans("section.interaction"), items));
        }

        if ctx.mode.shows_layout() {
            sections.push(Section::new(
                ctx.trans("section.label"),
                c.label
                    .property_item(ctx, &ctx.trans("comp.label"))
                    .into_iter()
                    .collect(),
            ));
            sections.push(Section::new(
                ctx.trans("section.style"),
                c.style
                    .property_item(ctx, &ctx.trans("section.style"))
                    .into_iter()
                    .collect(),
            ));
            sections.push(Section::new(
                ctx.trans("section.labelStyle"),
                c.label_style
                    .property_item(ctx, &ctx.trans("section.labelStyle"))
                    .into_iter()
                    .collect(),
            ));
            sections.push(Section::new(
                ctx.trans("section.inputFieldStyle"),
                c.input_field_style
                    .property_item(ctx, &ctx.trans("section.inputFieldStyle"))
                    .into_iter()
                    .collect(),
            ));
            sections.push(
                Section::new(
                    ctx.trans("section.animationStyle"),
                    c.animation_style
                        .property_item(ctx, &ctx.trans("section.animationStyle"))
                        .into_iter()
                        .collect(),
                )
                .with_tooltip(),
            );
        }

        sections
    })
    .set_expose_method_configs(ref_methods(&[
        RefMethod::Focus,
        RefMethod::Blur,
        RefMethod::Click,
    ]))
    .build()?;

    let mut exposed = vec![ExposedValueConfig::new(
        "value",
        "switch.valueDesc",
        |c: &SwitchChildren| json!(c.value.value()),
    )];
    exposed.extend(common_exposed_configs());

    Ok(Arc::new(with_exposing(def, exposed)?))
}

/// The switch's interaction entry point: update the value, then fire
/// `change` followed by `true` or `false`, all within one exposure sync.
pub fn toggle(instance: &mut WidgetInstance<SwitchChildren, SwitchView>, checked: bool) {
    instance.update(|c| {
        c.value.on_change(checked);
        c.on_event.fire("change");
        c.on_event.fire(if checked { "true" } else { "false" });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ref_control::test_support::CountingHandle;
    use crate::i18n::KeyEcho;
    use crate::namespace::ExposureNamespace;
    use crate::property_view::{EditorMode, PropertyViewCtx};
    use parking_lot::Mutex;
    use std::sync::atomic::Ordering;
    use std::sync::Arc as StdArc;

    fn make_instance() -> WidgetInstance<SwitchChildren, SwitchView> {
        WidgetInstance::new(switch_definition().unwrap())
    }

    fn ctx(mode: EditorMode) -> PropertyViewCtx {
        PropertyViewCtx::new(mode, StdArc::new(KeyEcho))
    }

    #[test]
    fn toggle_fires_change_then_state_event_in_order() {
        let mut instance = make_instance();
        let log: StdArc<Mutex<Vec<&str>>> = StdArc::new(Mutex::new(Vec::new()));

        instance.update(|c| {
            for (event, tag) in [
                ("change", "change-1"),
                ("change", "change-2"),
                ("true", "open"),
                ("false", "close"),
            ] {
                let log = log.clone();
                c.on_event
                    .bind(event, Value::Null, move || log.lock().push(tag))
                    .unwrap();
            }
        });

        toggle(&mut instance, true);
        assert_eq!(*log.lock(), vec!["change-1", "change-2", "open"]);

        log.lock().clear();
        toggle(&mut instance, false);
        assert_eq!(*log.lock(), vec!["change-1", "change-2", "close"]);
    }

    #[test]
    fn toggle_with_no_bindings_is_noop() {
        let mut instance = make_instance();
        toggle(&mut instance, true);
        assert!(instance.children().value.value());
    }

    #[test]
    fn exposes_value_and_common_flags() {
        let ns = ExposureNamespace::new();
        let mut instance = make_instance();
        instance.attach_namespace(&ns, "switch1").unwrap();

        toggle(&mut instance, true);
        assert_eq!(ns.read("switch1", "value"), Some(json!(true)));
        assert_eq!(ns.read("switch1", "disabled"), Some(json!(false)));
        assert_eq!(ns.read("switch1", "hidden"), Some(json!(false)));
    }

    #[test]
    fn disabled_expression_reads_other_widgets() {
        let ns = ExposureNamespace::new();
        ns.writer("form1", ["submitting".to_string()].into())
            .publish([("submitting".to_string(), json!(true))].into())
            .unwrap();

        let mut instance = make_instance();
        instance.update(|c| c.disabled.set_code("form1.submitting"));
        instance.refresh(&ns.snapshot());

        assert!(instance.children().disabled.value());
        assert!(instance.render().disabled);
    }

    #[test]
    fn legacy_style_payload_is_translated_on_restore() {
        let mut instance = make_instance();
        instance.restore(json!({
            "value": true,
            "inputFieldStyle": {
                "unChecked": "#fff",
                "checked": "#000",
                "handle": "#abc",
                "label": "x"
            }
        }));

        let style = instance.children().input_field_style.inner();
        assert_eq!(style.token("unchecked"), Some("#fff"));
        assert_eq!(style.token("checked"), Some("#000"));
        assert_eq!(style.token("handle"), Some("#abc"));
        assert_eq!(style.token("label"), Some("x"));

        // No legacy key survives into the current persisted shape.
        let persisted = instance.persisted();
        assert_eq!(
            persisted["inputFieldStyle"],
            json!({"unchecked": "#fff", "checked": "#000", "handle": "#abc", "label": "x"})
        );
    }

    #[test]
    fn current_shape_style_restores_unchanged() {
        let payload = json!({"inputFieldStyle": {"unchecked": "#eee"}});
        let mut instance = make_instance();
        instance.restore(payload.clone());
        assert_eq!(
            instance.children().input_field_style.inner().token("unchecked"),
            Some("#eee")
        );
    }

    #[test]
    fn property_pane_sections_follow_editor_mode() {
        let instance = make_instance();

        let names = |mode| -> Vec<String> {
            instance
                .property_pane(&ctx(mode))
                .into_iter()
                .map(|s| s.name)
                .collect()
        };

        assert_eq!(
            names(EditorMode::Both),
            vec![
                "section.basic",
                "section.interaction",
                "section.label",
                "section.style",
                "section.labelStyle",
                "section.inputFieldStyle",
                "section.animationStyle"
            ]
        );
        assert_eq!(
            names(EditorMode::Logic),
            vec!["section.basic", "section.interaction"]
        );
        assert!(!names(EditorMode::Layout).contains(&"section.interaction".to_string()));
    }

    #[test]
    fn label_style_filters_accent_and_validate() {
        let instance = make_instance();
        let style = &instance.children().label_style;
        assert_eq!(style.token("accent"), None);
        assert_eq!(style.token("validate"), None);
        assert_eq!(style.token("label"), Some("#222222"));
    }

    #[test]
    fn methods_are_silent_until_mounted() {
        let mut instance = make_instance();
        assert!(instance.invoke_method("focus", Value::Null).is_none());
        assert!(instance.invoke_method("click", Value::Null).is_none());

        let handle = CountingHandle::default();
        let clicks = handle.click_calls.clone();
        instance.update(|c| c.view_ref.attach(Box::new(handle)));

        assert_eq!(instance.invoke_method("click", Value::Null), Some(Value::Null));
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert_eq!(
            instance.invoke_method("focus", json!([{"preventScroll": true}])),
            Some(Value::Null)
        );
    }

    #[test]
    fn registers_and_renders_through_the_registry() {
        let registry = crate::registry::WidgetRegistry::builder()
            .register(switch_definition().unwrap())
            .unwrap()
            .build();

        let mut instance = registry.create_instance("switch").unwrap();
        let view = instance.render_value();
        assert_eq!(view["checked"], json!(false));
        assert_eq!(view["label"]["text"], json!("Switch"));
    }

    #[test]
    fn render_projects_current_state() {
        let mut instance = make_instance();
        toggle(&mut instance, true);
        let view = instance.render();
        assert!(view.checked);
        assert_eq!(view.input_field_style["checked"], "#1e88e5");
        assert_eq!(view.label.text, "Switch");
    }
}
