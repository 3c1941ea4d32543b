use anyhow::{anyhow, bail, Context, Result};
use lfilt::signal::filter::{lfilter, lfilter_zi};
use ndarray::{array, Array1, Array2, ArrayD, Axis};
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const DEFAULT_PYTHON_BIN: &str = "python";
const MAX_ABS_TOLERANCE: f64 = 1e-9;

const PY_LFILTER_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import scipy
import scipy.signal

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _tensor(key):
    t = p.get(key)
    if t is None:
        return None
    data = np.asarray(t["data"], dtype=float)
    if t["complex"]:
        data = data[0::2] + 1j * data[1::2]
    return data.reshape(t["shape"])

def _flat(v):
    v = np.asarray(v).reshape(-1)
    if np.iscomplexobj(v):
        return np.column_stack([v.real, v.imag]).reshape(-1)
    return v.astype(float)

def _compute():
    if op == "lfilter":
        zi = _tensor("zi")
        if zi is None:
            y = scipy.signal.lfilter(_tensor("b"), _tensor("a"), _tensor("x"), axis=p["axis"])
            return _flat(y)
        y, zf = scipy.signal.lfilter(_tensor("b"), _tensor("a"), _tensor("x"), axis=p["axis"], zi=zi)
        return np.concatenate([_flat(y), _flat(zf)])
    if op == "lfilter_zi":
        return _flat(scipy.signal.lfilter_zi(_tensor("b"), _tensor("a")))
    raise ValueError(f"unknown op {op}")

y = _compute()
t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": y.tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__
}))
"#;

// butter(4, 0.1)
const BUTTER4_B: [f64; 5] = [
    4.165_992_044_065_786e-4,
    1.666_396_817_626_314_4e-3,
    2.499_595_226_439_471_6e-3,
    1.666_396_817_626_314_4e-3,
    4.165_992_044_065_786e-4,
];
const BUTTER4_A: [f64; 5] = [
    1.0,
    -3.180_638_548_874_721,
    3.861_194_348_994_213_3,
    -2.112_155_355_110_969,
    0.438_265_142_261_979_77,
];

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
}

/// Array payload: row-major data, complex values interleaved as `re, im`.
#[derive(Debug, Serialize, Clone)]
struct Tensor {
    data: Vec<f64>,
    shape: Vec<usize>,
    complex: bool,
}

impl Tensor {
    fn real<D: ndarray::Dimension>(array: &ndarray::Array<f64, D>) -> Self {
        Self {
            data: array.iter().copied().collect(),
            shape: array.shape().to_vec(),
            complex: false,
        }
    }

    fn complex<D: ndarray::Dimension>(array: &ndarray::Array<Complex<f64>, D>) -> Self {
        Self {
            data: interleave(array.iter()),
            shape: array.shape().to_vec(),
            complex: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ParityRow {
    case_id: String,
    len: usize,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    rust_ns: f64,
    python_ns: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ParityBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    max_abs_tolerance: f64,
    rows: Vec<ParityRow>,
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("parity") => run_parity(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- parity");
            Ok(())
        }
    }
}

fn run_parity() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/parity/{ts}"));
    fs::create_dir_all(&out_dir).context("creating parity output directory")?;

    let python_bin = detect_python_bin();
    let mut rows = Vec::new();

    let signal: Vec<f64> = (0..512)
        .map(|i| {
            let x = i as f64 / 27.0;
            x.sin() + 0.35 * (2.3 * x).cos() + 0.1 * (7.0 * x).sin()
        })
        .collect();
    let x1 = Array1::from(signal.clone()).into_dyn();
    let butter_b = Array1::from(BUTTER4_B.to_vec());
    let butter_a = Array1::from(BUTTER4_A.to_vec());

    // FIR, 1D
    {
        let b = Array1::from_iter((0..31).map(|i| {
            let t = (i as f64 - 15.0) / 6.0;
            (-(t * t) / 2.0).exp() / 15.0
        }));
        let a = array![1.0];
        let run = || lfilter(b.view(), a.view(), x1.view(), None, None);
        let (y, _) = run().map_err(|e| anyhow!("fir candidate failed: {e}"))?;
        let py = python_eval(
            &python_bin,
            "lfilter",
            json!({
                "b": Tensor::real(&b),
                "a": Tensor::real(&a),
                "x": Tensor::real(&x1),
                "axis": -1
            }),
            200,
        )?;
        let rust_ns = benchmark_avg_ns(200, || run().map(|_| ()).map_err(|e| anyhow!("{e}")))?;
        let candidate: Vec<f64> = y.iter().copied().collect();
        rows.push(record_case("lfilter_fir31_f64", &candidate, &py, rust_ns)?);
    }

    // IIR, 1D
    {
        let run = || lfilter(butter_b.view(), butter_a.view(), x1.view(), None, None);
        let (y, _) = run().map_err(|e| anyhow!("iir candidate failed: {e}"))?;
        let py = python_eval(
            &python_bin,
            "lfilter",
            json!({
                "b": Tensor::real(&butter_b),
                "a": Tensor::real(&butter_a),
                "x": Tensor::real(&x1),
                "axis": -1
            }),
            200,
        )?;
        let rust_ns = benchmark_avg_ns(200, || run().map(|_| ()).map_err(|e| anyhow!("{e}")))?;
        let candidate: Vec<f64> = y.iter().copied().collect();
        rows.push(record_case("lfilter_butter4_f64", &candidate, &py, rust_ns)?);
    }

    // Steady-state initial conditions
    {
        let zi = lfilter_zi(butter_b.view(), butter_a.view())
            .map_err(|e| anyhow!("lfilter_zi candidate failed: {e}"))?;
        let py = python_eval(
            &python_bin,
            "lfilter_zi",
            json!({ "b": Tensor::real(&butter_b), "a": Tensor::real(&butter_a) }),
            200,
        )?;
        let rust_ns = benchmark_avg_ns(200, || {
            lfilter_zi(butter_b.view(), butter_a.view())
                .map(|_| ())
                .map_err(|e| anyhow!("{e}"))
        })?;
        rows.push(record_case("lfilter_zi_butter4_f64", &zi.to_vec(), &py, rust_ns)?);
    }

    // IIR along axis 0 of a 2D input with a broadcast initial state
    {
        let columns: Vec<_> = (0..8).map(|k| x1.slice(ndarray::s![k * 16..k * 16 + 256])).collect();
        let x2: ArrayD<f64> = ndarray::stack(Axis(1), &columns)
            .context("stacking columns")?
            .into_dyn();
        let zi: Array2<f64> = lfilter_zi(butter_b.view(), butter_a.view())
            .map_err(|e| anyhow!("{e}"))?
            .insert_axis(Axis(1));
        let zi = zi.into_dyn();
        let run = || lfilter(butter_b.view(), butter_a.view(), x2.view(), Some(0), Some(zi.view()));
        let (y, zf) = run().map_err(|e| anyhow!("broadcast candidate failed: {e}"))?;
        let zf = zf.context("zf missing")?;
        let py = python_eval(
            &python_bin,
            "lfilter",
            json!({
                "b": Tensor::real(&butter_b),
                "a": Tensor::real(&butter_a),
                "x": Tensor::real(&x2),
                "zi": Tensor::real(&zi),
                "axis": 0
            }),
            100,
        )?;
        let rust_ns = benchmark_avg_ns(100, || run().map(|_| ()).map_err(|e| anyhow!("{e}")))?;
        let candidate: Vec<f64> = y.iter().chain(zf.iter()).copied().collect();
        rows.push(record_case("lfilter_axis0_broadcast_zi_f64", &candidate, &py, rust_ns)?);
    }

    // Complex coefficients and input
    {
        let b = array![Complex::new(0.2, 0.1), Complex::new(0.3, -0.2), Complex::new(0.1, 0.0)];
        let a = array![Complex::new(1.5, 0.5), Complex::new(-0.4, 0.2), Complex::new(0.1, -0.05)];
        let xc: ArrayD<Complex<f64>> = x1
            .iter()
            .zip(x1.iter().collect::<Vec<_>>().into_iter().rev())
            .map(|(&re, &im)| Complex::new(re, im))
            .collect::<Array1<_>>()
            .into_dyn();
        let zi = array![Complex::new(0.5, 0.0), Complex::new(0.0, -0.5)];
        let run = || lfilter(b.view(), a.view(), xc.view(), None, Some(zi.view().into_dyn()));
        let (y, zf) = run().map_err(|e| anyhow!("complex candidate failed: {e}"))?;
        let zf = zf.context("zf missing")?;
        let py = python_eval(
            &python_bin,
            "lfilter",
            json!({
                "b": Tensor::complex(&b),
                "a": Tensor::complex(&a),
                "x": Tensor::complex(&xc),
                "zi": Tensor::complex(&zi),
                "axis": -1
            }),
            200,
        )?;
        let rust_ns = benchmark_avg_ns(200, || run().map(|_| ()).map_err(|e| anyhow!("{e}")))?;
        let candidate = interleave(y.iter().chain(zf.iter()));
        rows.push(record_case("lfilter_iir_complex128", &candidate, &py, rust_ns)?);
    }

    let versions = python_eval(
        &python_bin,
        "lfilter_zi",
        json!({ "b": Tensor::real(&array![1.0]), "a": Tensor::real(&array![1.0]) }),
        0,
    )?;
    let bundle = ParityBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.display().to_string(),
        python_version: versions.python_version,
        numpy_version: versions.numpy_version,
        scipy_version: versions.scipy_version.unwrap_or_default(),
        max_abs_tolerance: MAX_ABS_TOLERANCE,
        rows,
    };

    let summary_json = out_dir.join("summary.json");
    fs::write(
        &summary_json,
        serde_json::to_vec_pretty(&bundle).context("serializing parity bundle")?,
    )
    .with_context(|| format!("writing {}", summary_json.display()))?;
    let summary_csv = out_dir.join("summary.csv");
    write_summary_csv(&summary_csv, &bundle.rows)?;

    println!("Parity artifacts:");
    println!("  - {}", summary_json.display());
    println!("  - {}", summary_csv.display());
    for row in &bundle.rows {
        println!(
            "  {:<32} max_abs={:.3e} rust={:.0}ns python={:.0}ns",
            row.case_id, row.max_abs, row.rust_ns, row.python_ns
        );
    }

    let failing: Vec<&str> = bundle
        .rows
        .iter()
        .filter(|row| row.max_abs.is_nan() || row.max_abs > MAX_ABS_TOLERANCE)
        .map(|row| row.case_id.as_str())
        .collect();
    if !failing.is_empty() {
        bail!("cases above max_abs tolerance {MAX_ABS_TOLERANCE:e}: {failing:?}");
    }
    Ok(())
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_LFILTER_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

fn record_case(
    case_id: &str,
    candidate: &[f64],
    py: &PythonEval,
    rust_ns: f64,
) -> Result<ParityRow> {
    if candidate.len() != py.output.len() {
        bail!(
            "case {case_id} has mismatched output lengths: rust={}, python={}",
            candidate.len(),
            py.output.len()
        );
    }
    Ok(ParityRow {
        case_id: case_id.to_string(),
        len: candidate.len(),
        pearson_r: pearson(candidate, &py.output),
        mae: mean_abs_error(candidate, &py.output),
        rmse: root_mean_squared_error(candidate, &py.output),
        max_abs: max_abs_error(candidate, &py.output),
        rust_ns,
        python_ns: py.avg_ns,
        speedup_vs_python: py.avg_ns / rust_ns,
    })
}

fn interleave<'a>(values: impl Iterator<Item = &'a Complex<f64>>) -> Vec<f64> {
    values.flat_map(|c| [c.re, c.im]).collect()
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters.max(1) as f64)
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = *x - mean_a;
        let db = *y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        if a == b {
            1.0
        } else {
            0.0
        }
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

fn write_summary_csv(path: &Path, rows: &[ParityRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,len,pearson_r,mae,rmse,max_abs,rust_ns,python_ns,speedup_vs_python\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{:.12},{:.12},{:.12},{:.12},{:.3},{:.3},{:.6}\n",
            row.case_id,
            row.len,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.rust_ns,
            row.python_ns,
            row.speedup_vs_python,
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}
