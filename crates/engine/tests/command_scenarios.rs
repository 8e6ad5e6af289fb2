use paramdeck_engine::{CommandBuilder, FalsyPolicy};
use paramdeck_types::{ParameterForm, PendingCommand};

fn builder() -> CommandBuilder {
    CommandBuilder::new(FalsyPolicy::TextPresence)
}

#[test]
fn single_target_with_bounds() {
    let command = builder().add_from_text("comp1.x", Some("0"), Some("10"), None, None, None);
    assert_eq!(command.to_command_text("path"), "path.add_parameter('comp1.x',low=0,high=10);");
}

#[test]
fn single_target_with_zero_treated_as_absent() {
    let command = CommandBuilder::new(FalsyPolicy::ZeroIsAbsent).add_from_text("comp1.x", Some("0"), Some("10"), None, None, None);
    assert_eq!(command.to_command_text("path"), "path.add_parameter('comp1.x',high=10);");
}

#[test]
fn group_target_from_dialog_form() {
    let form = ParameterForm {
        target: " a.x , a.y ".into(),
        name: "grp1".into(),
        ..Default::default()
    };
    let command = builder().add(PendingCommand::from_form(form));
    assert_eq!(command.to_command_text("path"), "path.add_parameter(('a.x','a.y',),name='grp1');");
}

#[test]
fn remove_group_and_single_identities() {
    assert_eq!(builder().remove("a.x,a.y").to_command_text("path"), "path.remove_parameter((a.x,a.y));");
    assert_eq!(builder().remove("a.x").to_command_text("path"), "path.remove_parameter(\"a.x\");");
}

#[test]
fn remove_literal_names_the_same_members_as_add() {
    let add = builder().add_from_text("a.x, a.y", None, None, None, None, None);
    let add_text = add.to_command_text("path");
    let add_members: Vec<String> = add_text
        .trim_start_matches("path.add_parameter((")
        .trim_end_matches(",));")
        .split(',')
        .map(|member| member.trim_matches('\'').to_string())
        .collect();

    let remove_text = builder().remove("a.x,a.y").to_command_text("path");
    let remove_members: Vec<String> = remove_text
        .trim_start_matches("path.remove_parameter((")
        .trim_end_matches("));")
        .split(',')
        .map(str::to_string)
        .collect();

    assert_eq!(add_members, remove_members);
}

#[test]
fn clear_parameters() {
    assert_eq!(builder().clear().to_command_text("path"), "path.clear_parameters();");
}
