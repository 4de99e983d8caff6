#![no_main]

use junit_platform_starter::ArtifactCoordinate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    // Parsing must never panic
    if let Ok(coordinate) = input.parse::<ArtifactCoordinate>() {
        // A parsed coordinate prints back to something that parses the same
        let printed = coordinate.to_string();
        let reparsed: ArtifactCoordinate = printed
            .parse()
            .expect("printed coordinate does not parse");
        assert_eq!(coordinate, reparsed);
        assert!(!coordinate.group.is_empty(), "Empty group");
        assert!(!coordinate.artifact.is_empty(), "Empty artifact");
        assert_eq!(
            coordinate.key(),
            format!("{}:{}", coordinate.group, coordinate.artifact)
        );
    }
});
