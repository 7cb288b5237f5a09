//! Built-in bot node catalog.
//!
//! The backend normally supplies the catalog. This set covers the common
//! nodes so the editor and the inspection tool work offline.

use crate::catalog::{CategoryInfo, NodeCatalog};
use crate::node_types::{NodeDefinition, PortDefinition, PortType};
use crate::value::NodeData;

pub const EXEC_IN: &str = "exec_in";
pub const EXEC_OUT: &str = "exec_out";

fn exec_in() -> PortDefinition {
    PortDefinition::exec(EXEC_IN, "Exec")
}

fn exec_out() -> PortDefinition {
    PortDefinition::exec(EXEC_OUT, "Exec")
}

fn port(id: &str, label: &str, ty: PortType) -> PortDefinition {
    PortDefinition::new(id, label, ty)
}

fn node(
    node_type: &str,
    label: &str,
    category: &str,
    icon: &str,
    description: &str,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
) -> NodeDefinition {
    let mut def = NodeDefinition::new(node_type, label, category);
    def.icon = icon.into();
    def.description = description.into();
    def.inputs = inputs;
    def.outputs = outputs;
    def
}

fn trigger(node_type: &str, label: &str, icon: &str, description: &str, extra: Vec<PortDefinition>) -> NodeDefinition {
    let mut outputs = vec![exec_out(), port("bot", "Bot", PortType::Bot)];
    outputs.extend(extra);
    let mut def = node(node_type, label, "trigger", icon, description, Vec::new(), outputs);
    def.trigger = true;
    def
}

fn binary_math(node_type: &str, label: &str, icon: &str, description: &str) -> NodeDefinition {
    node(
        node_type,
        label,
        "math",
        icon,
        description,
        vec![
            port("a", "A", PortType::Number).with_default("0"),
            port("b", "B", PortType::Number).with_default("0"),
        ],
        vec![port("result", "Result", PortType::Number)],
    )
}

pub fn standard_categories() -> Vec<CategoryInfo> {
    vec![
        CategoryInfo::new("trigger", "Triggers", 10),
        CategoryInfo::new("math", "Math", 20),
        CategoryInfo::new("logic", "Logic", 30),
        CategoryInfo::new("action", "Actions", 40),
        CategoryInfo::new("data", "Data", 50),
        CategoryInfo::new("flow", "Flow Control", 60),
    ]
}

pub fn standard_definitions() -> Vec<NodeDefinition> {
    let mut on_interval = trigger(
        "trigger.on_interval",
        "On Interval",
        "Timer",
        "Fires at a fixed interval",
        vec![port("iteration", "Iteration", PortType::Number)],
    );
    on_interval.inputs = vec![port("interval", "Interval (ms)", PortType::Number).with_default("1000")];
    on_interval.default_data = NodeData::new().with("interval", 1000.0);

    let mut compare = node(
        "logic.compare",
        "Compare",
        "logic",
        "Scale",
        "Compares two values",
        vec![port("a", "A", PortType::Any), port("b", "B", PortType::Any)],
        vec![port("result", "Result", PortType::Boolean)],
    );
    compare.default_data = NodeData::new().with("operator", "==");
    compare.keywords = vec!["equals".into(), "greater".into(), "less".into()];

    let mut log = node(
        "action.log",
        "Log",
        "action",
        "MessageSquare",
        "Writes a message to the script log",
        vec![exec_in(), port("message", "Message", PortType::String).with_default("")],
        vec![exec_out()],
    );
    log.default_data = NodeData::new().with("level", "info");
    log.keywords = vec!["print".into(), "debug".into()];

    let mut wait = node(
        "action.wait",
        "Wait",
        "action",
        "Clock",
        "Pauses execution for a duration",
        vec![exec_in(), port("duration", "Duration (ms)", PortType::Number).with_default("1000")],
        vec![exec_out()],
    );
    wait.keywords = vec!["delay".into(), "sleep".into()];

    let mut loop_node = node(
        "flow.loop",
        "Loop",
        "flow",
        "Repeat",
        "Repeats execution a number of times",
        vec![exec_in(), port("count", "Count", PortType::Number).with_default("10")],
        vec![
            PortDefinition::exec("loop", "Loop"),
            port("index", "Index", PortType::Number),
            PortDefinition::exec("done", "Done"),
        ],
    );
    loop_node.keywords = vec!["for".into(), "repeat".into(), "iterate".into()];

    let mut get_variable = node(
        "data.get_variable",
        "Get Variable",
        "data",
        "Variable",
        "Reads a script variable",
        Vec::new(),
        vec![port("value", "Value", PortType::Any)],
    );
    get_variable.default_data = NodeData::new().with("variable_name", "");

    let mut set_variable = node(
        "data.set_variable",
        "Set Variable",
        "data",
        "Variable",
        "Writes a script variable",
        vec![exec_in(), port("value", "Value", PortType::Any)],
        vec![exec_out()],
    );
    set_variable.default_data = NodeData::new().with("variable_name", "");

    let mut concat = node(
        "data.join",
        "Join Strings",
        "data",
        "Type",
        "Joins any number of strings",
        vec![port("parts", "Parts", PortType::String).multi_input()],
        vec![port("result", "Result", PortType::String)],
    );
    concat.keywords = vec!["concat".into(), "append".into()];

    let mut old_say = node(
        "action.say",
        "Say",
        "action",
        "Send",
        "Sends a chat message",
        vec![exec_in(), port("message", "Message", PortType::String)],
        vec![exec_out()],
    );
    old_say.deprecated = Some("Use Send Chat instead".into());

    vec![
        trigger("trigger.on_tick", "On Tick", "Clock", "Fires every game tick", Vec::new()),
        trigger(
            "trigger.on_chat",
            "On Chat",
            "MessageSquare",
            "Fires when a chat message is received",
            vec![
                port("message", "Message", PortType::String),
                port("sender", "Sender", PortType::String),
            ],
        ),
        trigger(
            "trigger.on_damage",
            "On Damage",
            "Zap",
            "Fires when the bot takes damage",
            vec![
                port("amount", "Amount", PortType::Number),
                port("source", "Source", PortType::Entity),
            ],
        ),
        on_interval,
        binary_math("math.add", "Add", "Plus", "Adds two numbers"),
        binary_math("math.subtract", "Subtract", "Minus", "Subtracts B from A"),
        binary_math("math.multiply", "Multiply", "X", "Multiplies two numbers"),
        node(
            "math.vector3",
            "Make Vector",
            "math",
            "Move3d",
            "Builds a vector from three numbers",
            vec![
                port("x", "X", PortType::Number).with_default("0"),
                port("y", "Y", PortType::Number).with_default("0"),
                port("z", "Z", PortType::Number).with_default("0"),
            ],
            vec![port("vector", "Vector", PortType::Vector3)],
        ),
        compare,
        node(
            "logic.and",
            "AND",
            "logic",
            "Circle",
            "True when both inputs are true",
            vec![port("a", "A", PortType::Boolean), port("b", "B", PortType::Boolean)],
            vec![port("result", "Result", PortType::Boolean)],
        ),
        node(
            "logic.not",
            "NOT",
            "logic",
            "Ban",
            "Inverts a boolean",
            vec![port("value", "Value", PortType::Boolean)],
            vec![port("result", "Result", PortType::Boolean)],
        ),
        log,
        node(
            "action.send_chat",
            "Send Chat",
            "action",
            "Send",
            "Sends a chat message",
            vec![exec_in(), port("message", "Message", PortType::String).required()],
            vec![exec_out()],
        ),
        node(
            "action.move_to",
            "Move To",
            "action",
            "Navigation",
            "Walks the bot to a position",
            vec![exec_in(), port("position", "Position", PortType::Vector3)],
            vec![exec_out(), port("success", "Success", PortType::Boolean)],
        ),
        node(
            "action.attack",
            "Attack",
            "action",
            "Sword",
            "Attacks an entity",
            vec![exec_in(), port("bot", "Bot", PortType::Bot), port("target", "Target", PortType::Entity)],
            vec![exec_out()],
        ),
        wait,
        old_say,
        node(
            "data.number",
            "Number",
            "data",
            "Hash",
            "A constant number",
            Vec::new(),
            vec![port("value", "Value", PortType::Number)],
        ),
        node(
            "data.string",
            "String",
            "data",
            "Type",
            "A constant string",
            Vec::new(),
            vec![port("value", "Value", PortType::String)],
        ),
        node(
            "data.nearby_players",
            "Nearby Players",
            "data",
            "Users",
            "Lists players around the bot",
            vec![port("bot", "Bot", PortType::Bot)],
            vec![port("players", "Players", PortType::List).list_of(PortType::Entity)],
        ),
        get_variable,
        set_variable,
        concat,
        node(
            "flow.branch",
            "Branch",
            "flow",
            "GitBranch",
            "Branches execution on a condition",
            vec![exec_in(), port("condition", "Condition", PortType::Boolean)],
            vec![PortDefinition::exec("true", "True"), PortDefinition::exec("false", "False")],
        ),
        loop_node,
        node(
            "flow.sequence",
            "Sequence",
            "flow",
            "List",
            "Runs its outputs one after another",
            vec![exec_in()],
            vec![
                PortDefinition::exec("out1", "1"),
                PortDefinition::exec("out2", "2"),
                PortDefinition::exec("out3", "3"),
            ],
        ),
    ]
}

pub fn standard_catalog() -> NodeCatalog {
    NodeCatalog::new(standard_definitions(), standard_categories())
}
