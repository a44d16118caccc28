use lagens_core::{Dataset, Variable};

fn member() -> Dataset {
    let mut ds = Dataset::new();
    ds.dims.insert("time".into(), 3);
    ds.dims.insert("height6".into(), 1);
    ds.coords.insert(
        "time".into(),
        Variable::new(["time"], vec![Some(0.0), Some(3600.0), Some(7200.0)]),
    );
    ds.coords
        .insert("height6".into(), Variable::new(["height6"], vec![Some(2.0)]));
    ds.data_vars.insert(
        "air_temperature_2m".into(),
        Variable::new(
            ["time", "height6"],
            vec![Some(271.0), Some(272.0), Some(273.0)],
        ),
    );
    ds
}

#[test]
fn rename_touches_dims_coords_and_variable_dims() {
    let mut ds = member();
    ds.rename("height6", "height2").expect("rename");
    assert!(ds.dims.contains_key("height2"));
    assert!(!ds.dims.contains_key("height6"));
    assert!(ds.coords.contains_key("height2"));
    assert_eq!(
        ds.data_vars["air_temperature_2m"].dims,
        vec!["time".to_string(), "height2".to_string()]
    );
    ds.validate().expect("still valid");
}

#[test]
fn rename_refuses_to_clobber() {
    let mut ds = member();
    ds.dims.insert("height2".into(), 1);
    let err = ds.rename("height6", "height2").expect_err("conflict");
    assert_eq!(err.code(), "rename_conflict");
}

#[test]
fn reindex_inserts_missing_and_drops() {
    let ds = member();
    let grown = ds
        .reindex("time", &[Some(0), None, Some(2)])
        .expect("reindex");
    assert_eq!(grown.dim_len("time"), Some(3));
    assert_eq!(
        grown.data_vars["air_temperature_2m"].values,
        vec![Some(271.0), None, Some(273.0)]
    );
    let shrunk = ds.reindex("time", &[Some(1)]).expect("reindex");
    assert_eq!(shrunk.dim_len("time"), Some(1));
    assert_eq!(shrunk.coords["time"].values, vec![Some(3600.0)]);
    shrunk.validate().expect("valid");
}

#[test]
fn validate_reports_shape_mismatch() {
    let mut ds = member();
    ds.data_vars
        .get_mut("air_temperature_2m")
        .expect("var")
        .values
        .pop();
    let err = ds.validate().expect_err("bad shape");
    assert_eq!(err.code(), "variable_shape");
}

#[test]
fn max_value_ignores_missing() {
    let var = Variable::new(["m"], vec![None, Some(5.0), Some(3.0)]);
    assert_eq!(var.max_value(), Some(5.0));
    assert_eq!(Variable::new(["m"], vec![None]).max_value(), None);
}
