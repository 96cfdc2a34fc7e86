use csv::ReaderBuilder;
use glassbox::distill::select::SelectionPolicy;
use glassbox::distill::sweep::DepthSweep;
use nalgebra::{DMatrix, DVector};
use std::error::Error;

/// Reads a CSV whose last column holds the black-box model's prediction
/// for the row and whose remaining columns are the features.
fn read_predictions_file(
    file_path: &str,
    header: bool,
) -> Result<(DMatrix<f64>, DVector<f64>, Vec<String>), Box<dyn Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(header)
        .from_path(file_path)?;

    let feature_names: Vec<String> = if header {
        let mut names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        names.pop();
        names
    } else {
        Vec::new()
    };

    let mut features = Vec::new();
    let mut predictions = Vec::new();

    for result in reader.records() {
        let record = result?;
        let dimension = record
            .len()
            .checked_sub(1)
            .ok_or("Record has no columns")?;

        let mut feature_row = Vec::new();
        for feature in record.iter().take(dimension) {
            feature_row.push(feature.parse::<f64>()?);
        }

        let prediction = record.get(dimension).ok_or("Missing prediction column")?;
        features.push(feature_row);
        predictions.push(prediction.parse::<f64>()?);
    }

    if features.is_empty() {
        return Err("No data rows in file".into());
    }

    let feature_matrix =
        DMatrix::from_row_slice(features.len(), features[0].len(), &features.concat());
    let prediction_vector = DVector::from_vec(predictions);

    Ok((feature_matrix, prediction_vector, feature_names))
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "datasets/blackbox_predictions.csv".to_string());

    let (features, predictions, feature_names) = match read_predictions_file(&path, true) {
        Ok(data) => {
            println!("Loaded {} rows from {}", data.1.len(), path);
            data
        }
        Err(err) => panic!("{}", err),
    };

    let sweep = match DepthSweep::new((1..=6).collect(), 2) {
        Ok(sweep) => sweep,
        Err(err) => panic!("{}", err),
    };
    let result = match sweep.run(&features, &predictions) {
        Ok(result) => result,
        Err(err) => panic!("{}", err),
    };

    for (depth, r_squared) in result.r_squared_curve() {
        println!("depth {depth}: R^2 = {r_squared:.4}");
    }

    // Pick the depth by hand after reading the curve above.
    let chosen = match result.into_selected(SelectionPolicy::FixedDepth(3)) {
        Ok(chosen) => chosen,
        Err(err) => panic!("{}", err),
    };
    println!(
        "Selected depth {} (R^2 = {:.4})",
        chosen.tree.max_depth(),
        chosen.r_squared
    );

    let mut export = match chosen.tree.export() {
        Ok(export) => export,
        Err(err) => panic!("{}", err),
    };
    if !feature_names.is_empty() {
        let names: Vec<&str> = feature_names.iter().map(String::as_str).collect();
        export = match export.with_feature_names(&names) {
            Ok(named) => named,
            Err(err) => panic!("{}", err),
        };
    }

    for rule in export.rules() {
        println!("{rule}");
    }
}
