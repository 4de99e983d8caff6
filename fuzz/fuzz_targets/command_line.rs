#![no_main]

use arbitrary::Arbitrary;
use junit_platform_starter::{
    Artifact, ArtifactMap, CommandLineBuilder, Configuration, JavaOptions, ModuleDescriptor,
    ModuleTopology,
};
use libfuzzer_sys::fuzz_target;
use std::path::Path;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    main: Option<FuzzModule>,
    test: Option<FuzzModule>,
    tags: Vec<String>,
    parameters: Vec<(String, String)>,
    opens: Option<Vec<String>>,
    with_commons: bool,
    strict: bool,
}

#[derive(Arbitrary, Debug)]
struct FuzzModule {
    name: String,
    requires: Vec<String>,
    packages: Vec<String>,
}

impl FuzzModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new(self.name.clone())
            .requires(self.requires.clone())
            .packages(self.packages.clone())
    }
}

fuzz_target!(|input: FuzzInput| {
    let main = input.main.as_ref().map(FuzzModule::descriptor);
    let test = input.test.as_ref().map(FuzzModule::descriptor);
    let topology = ModuleTopology::new(main.clone(), test.clone());

    let mut config = Configuration::new().strict(input.strict);
    for tag in &input.tags {
        config = config.tag(tag.clone());
    }
    for (key, value) in &input.parameters {
        config = config.parameter(key.clone(), value.clone());
    }
    if let Some(opens) = &input.opens {
        config = config.java_options(JavaOptions::new().add_opens(opens.clone()));
    }

    let mut artifacts = ArtifactMap::new();
    if input.with_commons {
        artifacts.insert(Artifact::new(
            "org.junit.platform:junit-platform-commons:1.3.0".parse().unwrap(),
            "commons.jar",
        ));
    }

    let builder = CommandLineBuilder::new(
        Path::new("java"),
        &topology,
        &artifacts,
        &config,
        Path::new("test-classes"),
    );
    let cmd = builder
        .build(|| Ok("cp".to_string()))
        .expect("building never fails once the path argument exists");

    // Exactly one way of locating code, right after the executable
    assert!(cmd[1] == "--class-path" || cmd[1] == "--module-path");

    // One --add-opens per (package, target) pair, and only when patching
    let mut java = Vec::new();
    builder.add_java_options(&mut java, "cp");
    let opens = java.iter().filter(|t| *t == "--add-opens").count();
    let expected_opens = match (&main, &test) {
        (Some(main), None) => main.contained_packages().len() * builder.add_opens_modules().len(),
        _ => 0,
    };
    assert_eq!(opens, expected_opens);

    // Selection is always the final part
    let last = cmd.last().expect("command is never empty");
    match topology.selected_module() {
        Some(module) => assert_eq!(last, module),
        None => assert_eq!(last, "--scan-class-path"),
    }
});
