use serde_json::{json, Value};

/// The fixed command catalog advertised to the planner on every turn.
///
/// `done` is the only termination signal; the five `mutate_*` commands map
/// 1:1 to the five plan tables.
pub(super) fn command_catalog() -> Vec<Value> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "done",
                "description": "Call this when you have completed the user's goal. Provide a summary of what you did.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "summary": { "type": "string", "description": "A summary of the actions taken." }
                    },
                    "required": ["summary"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "mutate_tasks",
                "description": "Create, update, or delete tasks",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "action": { "type": "string", "enum": ["create", "update", "delete"] },
                        "id": { "type": "string", "description": "ID of task to update/delete" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "status": { "type": "string", "enum": ["todo", "in_progress", "done"] },
                                "priority": { "type": "string", "enum": ["low", "medium", "high"] },
                                "due_date": { "type": "string" },
                                "assignee_name": { "type": "string" }
                            }
                        }
                    },
                    "required": ["action"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "mutate_budget",
                "description": "Create, update, or delete budget items",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "action": { "type": "string", "enum": ["create", "update", "delete"] },
                        "id": { "type": "string", "description": "ID of budget item to update/delete" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "description": { "type": "string" },
                                "category": { "type": "string" },
                                "allocated": { "type": "number" },
                                "spent": { "type": "number" },
                                "notes": { "type": "string" }
                            }
                        }
                    },
                    "required": ["action"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "mutate_activities",
                "description": "Create, update, or delete activities",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "action": { "type": "string", "enum": ["create", "update", "delete"] },
                        "id": { "type": "string", "description": "ID of activity to update/delete" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "description": { "type": "string" },
                                "location": { "type": "string" },
                                "start_time": { "type": "string" },
                                "end_time": { "type": "string" },
                                "cost": { "type": "number" },
                                "notes": { "type": "string" },
                                "staffing_needs": { "type": "string" }
                            }
                        }
                    },
                    "required": ["action"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "mutate_shopping",
                "description": "Create, update, or delete shopping items",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "action": { "type": "string", "enum": ["create", "update", "delete"] },
                        "id": { "type": "string", "description": "ID of shopping item to update/delete" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "item": { "type": "string" },
                                "quantity": { "type": "number" },
                                "unit_cost": { "type": "number" },
                                "vendor": { "type": "string" },
                                "status": { "type": "string", "enum": ["pending", "ordered", "received", "cancelled"] },
                                "category": { "type": "string" },
                                "notes": { "type": "string" },
                                "budget_id": { "type": "number", "description": "ID of the budget item to link to" },
                                "items": {
                                    "type": "array",
                                    "description": "List of shopping items to create in bulk. Use this for creating multiple items at once.",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "item": { "type": "string" },
                                            "quantity": { "type": "number" },
                                            "unit_cost": { "type": "number" },
                                            "vendor": { "type": "string" },
                                            "status": { "type": "string", "enum": ["pending", "ordered", "received", "cancelled"] },
                                            "category": { "type": "string" },
                                            "notes": { "type": "string" },
                                            "budget_id": { "type": "number" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "required": ["action"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "mutate_schedule",
                "description": "Create, update, or delete schedule items",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "action": { "type": "string", "enum": ["create", "update", "delete"] },
                        "id": { "type": "string", "description": "ID of schedule item to update/delete" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "activity_name": { "type": "string" },
                                "start_time": { "type": "string" },
                                "end_time": { "type": "string" },
                                "location": { "type": "string" },
                                "description": { "type": "string" },
                                "notes": { "type": "string" },
                                "start_date": { "type": "string" }
                            }
                        }
                    },
                    "required": ["action"]
                }
            }
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_done_plus_five_tables() {
        let names: Vec<String> = command_catalog()
            .iter()
            .map(|def| def["function"]["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "done",
                "mutate_tasks",
                "mutate_budget",
                "mutate_activities",
                "mutate_shopping",
                "mutate_schedule"
            ]
        );
    }
}
