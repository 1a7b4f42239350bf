//! `echo`, `add` and `hello`.

use crate::registry::{Arguments, InputSchema, ParamSpec, ToolDescriptor, ToolEntry};
use crate::tools::{format_number, num_arg, str_arg, ToolFault};

/// Returns its `message` argument unchanged.
#[must_use]
pub fn echo() -> ToolEntry {
    ToolEntry {
        descriptor: ToolDescriptor {
            name: "echo".to_string(),
            description: "Returns the given message unchanged".to_string(),
            input_schema: InputSchema::new().param(
                ParamSpec::string("message")
                    .required()
                    .describe("Message to return"),
            ),
        },
        handler: run_echo,
    }
}

fn run_echo(args: &Arguments) -> Result<String, ToolFault> {
    str_arg(args, "message").map(str::to_string)
}

/// Adds two numbers.
#[must_use]
pub fn add() -> ToolEntry {
    ToolEntry {
        descriptor: ToolDescriptor {
            name: "add".to_string(),
            description: "Adds two numbers".to_string(),
            input_schema: InputSchema::new()
                .param(ParamSpec::number("a").required().describe("First number"))
                .param(ParamSpec::number("b").required().describe("Second number")),
        },
        handler: run_add,
    }
}

fn run_add(args: &Arguments) -> Result<String, ToolFault> {
    let a = num_arg(args, "a")?;
    let b = num_arg(args, "b")?;
    let sum = a + b;

    if !sum.is_finite() {
        return Err(ToolFault::Failed("sum is not a finite number".to_string()));
    }

    Ok(format!(
        "{} + {} = {}",
        format_number(a),
        format_number(b),
        format_number(sum)
    ))
}

/// Greets a person by name.
#[must_use]
pub fn hello() -> ToolEntry {
    ToolEntry {
        descriptor: ToolDescriptor {
            name: "hello".to_string(),
            description: "Returns a simple greeting".to_string(),
            input_schema: InputSchema::new().param(
                ParamSpec::string("name")
                    .required()
                    .describe("Name of the person to greet"),
            ),
        },
        handler: run_hello,
    }
}

fn run_hello(args: &Arguments) -> Result<String, ToolFault> {
    let name = str_arg(args, "name")?;
    Ok(format!("Hello, {name}! Greetings from the MCP server."))
}
